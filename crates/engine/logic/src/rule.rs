//! Rule definition

use crate::action::BasicAction;
use crate::{Error, Operand, Result, TruthTable};

/// Largest number of operands a rule can have
pub const MAX_OPERANDS: usize = 32;

/// Largest number of actions a rule can have
pub const MAX_ACTIONS: usize = 255;

/// A compiled rule: operands, the truth table over them, and the actions
/// dispatched when the table yields `true`
///
/// Operand `i` supplies bit `k - 1 - i` of the table index. Action `j` gets
/// the argument bytes from the end of action `j - 1` to its own end offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    operands: Vec<Operand>,
    table: TruthTable,
    action_ids: Vec<u32>,
    arg_ends: Vec<u32>,
    args: Vec<u8>,
}

impl Rule {
    /// Create a rule without actions
    pub fn new(operands: Vec<Operand>, table: TruthTable) -> Result<Self> {
        if operands.len() > MAX_OPERANDS {
            return Err(Error::TooManyOperands(operands.len()));
        }
        if operands.len() != table.variables() as usize {
            return Err(Error::OperandMismatch {
                operands: operands.len(),
                variables: table.variables(),
            });
        }
        Ok(Rule {
            operands,
            table,
            action_ids: Vec::new(),
            arg_ends: Vec::new(),
            args: Vec::new(),
        })
    }

    /// Rebuild a rule from its stored action layout
    pub fn from_parts(
        operands: Vec<Operand>,
        table: TruthTable,
        action_ids: Vec<u32>,
        arg_ends: Vec<u32>,
        args: Vec<u8>,
    ) -> Result<Self> {
        if action_ids.len() > MAX_ACTIONS {
            return Err(Error::TooManyActions(action_ids.len()));
        }
        if action_ids.len() != arg_ends.len() {
            return Err(Error::CorruptData(format!(
                "{} actions but {} argument offsets",
                action_ids.len(),
                arg_ends.len()
            )));
        }
        if arg_ends.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(Error::CorruptData(
                "argument offsets are not monotonic".to_string(),
            ));
        }
        let used = arg_ends.last().copied().unwrap_or(0) as usize;
        if used != args.len() {
            return Err(Error::CorruptData(format!(
                "argument offsets cover {} bytes, buffer holds {}",
                used,
                args.len()
            )));
        }

        let mut rule = Rule::new(operands, table)?;
        rule.action_ids = action_ids;
        rule.arg_ends = arg_ends;
        rule.args = args;
        Ok(rule)
    }

    /// Append an action (builder pattern)
    ///
    /// The action limit is enforced when the rule is encoded.
    pub fn with_action(mut self, id: u32, args: &[u8]) -> Self {
        self.args.extend_from_slice(args);
        self.action_ids.push(id);
        self.arg_ends.push(self.args.len() as u32);
        self
    }

    /// Append a basic action with its `u16` argument (builder pattern)
    pub fn with_basic_action(self, action: BasicAction, arg: u16) -> Self {
        self.with_action(action.id(), &arg.to_le_bytes())
    }

    /// Get the operands in table order
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Get the truth table
    pub fn table(&self) -> &TruthTable {
        &self.table
    }

    /// Get the number of actions
    pub fn action_count(&self) -> usize {
        self.action_ids.len()
    }

    /// Get the action IDs
    pub fn action_ids(&self) -> &[u32] {
        &self.action_ids
    }

    /// Get the cumulative end offset of each action's arguments
    pub fn arg_ends(&self) -> &[u32] {
        &self.arg_ends
    }

    /// Get the packed argument buffer
    pub fn args(&self) -> &[u8] {
        &self.args
    }

    /// Iterate over actions with their argument slices
    pub fn actions(&self) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        let starts = std::iter::once(0).chain(self.arg_ends.iter().copied());
        self.action_ids
            .iter()
            .zip(starts.zip(&self.arg_ends))
            .map(|(id, (start, end))| (*id, &self.args[start as usize..*end as usize]))
    }
}
