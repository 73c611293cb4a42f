//! Error types for the logic crate

use thiserror::Error;

/// Result type alias for logic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading or running rules
#[derive(Debug, Error)]
pub enum Error {
    /// Input ended before a complete record was read
    #[error("Truncated data: expected {expected_bytes} bytes, {available_bytes} available")]
    Truncated {
        expected_bytes: usize,
        available_bytes: usize,
    },

    /// Input was structurally invalid
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// Rule has more operands than a truth table can index
    #[error("Too many operands: {0} (at most 32)")]
    TooManyOperands(usize),

    /// Rule has more actions than the record format can count
    #[error("Too many actions: {0} (at most 255)")]
    TooManyActions(usize),

    /// Operand list and truth table disagree
    #[error("Rule has {operands} operands but its table indexes {variables} variables")]
    OperandMismatch { operands: usize, variables: u8 },

    /// Action ID belongs to the built-in action set
    #[error("Action {0} is reserved for basic actions")]
    ReservedAction(u32),

    /// Operand binding could not be parsed
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// Expression variable has no operand binding
    #[error("Variable '{0}' is not bound to an operand")]
    UnboundVariable(char),

    /// Expression failed to compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Temporary flag context error
    #[error(transparent)]
    Pool(#[from] pool::Error),
}

/// Errors reported by the expression compiler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// More than 32 distinct variables
    #[error("Too many variables: {0} (at most 32)")]
    TooManyVariables(usize),

    /// Expression contains no variable at all
    #[error("Expression has no variables")]
    NoVariables,

    /// Parentheses do not match up
    #[error("Unbalanced parentheses at position {0}")]
    UnbalancedParentheses(usize),

    /// Operator without a left or right operand
    #[error("Operator at position {0} is missing an operand")]
    MissingOperand(usize),

    /// Two operands follow each other without an operator
    #[error("Missing operator before position {0}")]
    MissingOperator(usize),

    /// Character that is neither a variable nor an operator
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },
}
