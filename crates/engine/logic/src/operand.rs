//! Rule operands

use crate::{Error, FlagId, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input bit of a rule
///
/// Written as `flag:N`, `plot:N`, `timer:N` or `predicate:N` in rule
/// sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operand {
    /// True while the flag is set
    Flag(FlagId),
    /// True while the plot number is greater than the threshold
    Plot(u16),
    /// True once the map timer with this index has expired
    Timer(u16),
    /// Answered by the caller's predicate (e.g. a collision test)
    Predicate(u16),
}

impl Operand {
    /// 2-bit kind tag used by the binary rule format
    pub fn tag(self) -> u8 {
        match self {
            Operand::Flag(_) => 0,
            Operand::Plot(_) => 1,
            Operand::Timer(_) => 2,
            Operand::Predicate(_) => 3,
        }
    }

    /// Numeric argument of the operand
    pub fn id(self) -> u16 {
        match self {
            Operand::Flag(id) | Operand::Plot(id) | Operand::Timer(id) | Operand::Predicate(id) => {
                id
            }
        }
    }

    /// Rebuild an operand from its tag and argument
    pub fn from_tag(tag: u8, id: u16) -> Self {
        match tag & 0x3 {
            0 => Operand::Flag(id),
            1 => Operand::Plot(id),
            2 => Operand::Timer(id),
            _ => Operand::Predicate(id),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Operand::Flag(_) => "flag",
            Operand::Plot(_) => "plot",
            Operand::Timer(_) => "timer",
            Operand::Predicate(_) => "predicate",
        };
        write!(f, "{}:{}", kind, self.id())
    }
}

impl FromStr for Operand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidOperand(s.to_string()))?;
        let id: u16 = id
            .trim()
            .parse()
            .map_err(|_| Error::InvalidOperand(s.to_string()))?;

        match kind.trim() {
            "flag" => Ok(Operand::Flag(id)),
            "plot" => Ok(Operand::Plot(id)),
            "timer" => Ok(Operand::Timer(id)),
            "predicate" => Ok(Operand::Predicate(id)),
            _ => Err(Error::InvalidOperand(s.to_string())),
        }
    }
}

impl TryFrom<String> for Operand {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Operand> for String {
    fn from(operand: Operand) -> Self {
        operand.to_string()
    }
}
