//! Human-editable rule sources
//!
//! A rule file lists rules as an expression, the operand each variable
//! stands for, and the actions to run:
//!
//! ```toml
//! [[rule]]
//! expression = "(a|b)&!c"
//! operands = { a = "flag:3", b = "timer:0", c = "predicate:1" }
//! actions = [
//!     { id = 0, arg = 12 },
//!     { id = 40, args = [1, 2, 3] },
//! ]
//! ```

use crate::rule::MAX_ACTIONS;
use crate::{compile, Error, Operand, Result, Rule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// One action of a rule source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSource {
    pub id: u32,
    /// Raw argument bytes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<u8>,
    /// Argument appended as a little-endian `u16` (what basic actions take)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<u16>,
}

impl ActionSource {
    /// Argument bytes as stored in the rule
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = self.args.clone();
        if let Some(arg) = self.arg {
            bytes.extend_from_slice(&arg.to_le_bytes());
        }
        bytes
    }
}

/// Rule as written by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSource {
    pub expression: String,
    /// Operand bound to each single-character variable
    #[serde(default)]
    pub operands: BTreeMap<String, Operand>,
    #[serde(default)]
    pub actions: Vec<ActionSource>,
}

impl RuleSource {
    /// Create a source for an expression with no bindings yet
    pub fn new(expression: impl Into<String>) -> Self {
        RuleSource {
            expression: expression.into(),
            operands: BTreeMap::new(),
            actions: Vec::new(),
        }
    }

    /// Bind a variable to an operand (builder pattern)
    pub fn bind(mut self, variable: char, operand: Operand) -> Self {
        self.operands.insert(variable.to_string(), operand);
        self
    }

    /// Add an action (builder pattern)
    pub fn then(mut self, id: u32, args: &[u8]) -> Self {
        self.actions.push(ActionSource {
            id,
            args: args.to_vec(),
            arg: None,
        });
        self
    }

    /// Compile into a rule with operands in dictionary order
    pub fn compile(&self) -> Result<Rule> {
        let compiled = compile(&self.expression)?;

        for key in self.operands.keys() {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if compiled.variable_index(c).is_some() => {}
                (Some(c), None) if c.is_ascii_alphanumeric() => {
                    warn!(variable = %c, expression = %self.expression, "Unused operand binding");
                }
                _ => return Err(Error::InvalidOperand(format!("binding key '{key}'"))),
            }
        }

        let operands = compiled
            .dictionary
            .iter()
            .map(|c| {
                self.operands
                    .get(&c.to_string())
                    .copied()
                    .ok_or(Error::UnboundVariable(*c))
            })
            .collect::<Result<Vec<_>>>()?;

        if self.actions.len() > MAX_ACTIONS {
            return Err(Error::TooManyActions(self.actions.len()));
        }

        let mut rule = Rule::new(operands, compiled.table)?;
        for action in &self.actions {
            rule = rule.with_action(action.id, &action.bytes());
        }
        Ok(rule)
    }
}

/// A file of rule sources, `[[rule]]` tables in TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleSource>,
}

impl RuleFile {
    /// Compile every rule, in file order
    pub fn compile(&self) -> Result<Vec<Rule>> {
        self.rules.iter().map(RuleSource::compile).collect()
    }
}
