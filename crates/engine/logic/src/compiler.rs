//! Expression compiler
//!
//! Turns a human-written boolean expression such as `(a|b)&!c` into a
//! [`TruthTable`] over its variables. Variables are single ASCII
//! alphanumeric characters, sorted into a dictionary that fixes their bit
//! position in the table.
//!
//! # Grammar
//!
//! | Syntax              | Meaning                 | Priority |
//! |---------------------|-------------------------|----------|
//! | `!x`, `~x`          | not                     | 4        |
//! | `&`, `*`            | and                     | 3        |
//! | `\|`, `+`           | or                      | 2        |
//! | `^`                 | xor                     | 1        |
//! | `=`, `==`           | biconditional           | 1        |
//! | `>`, `>=`, `<`      | comparison              | 1        |
//! | `<=`, `->`, `=>`    | implication             | 1        |
//!
//! Each enclosing pair of parentheses adds 8 to an operator's priority. A
//! `!` right before `&`, `|`, `^` or `=` negates the operator itself (`!&`
//! is NAND). Repeated operator characters (`&&`, `||`) count once.

use crate::error::CompileError;
use crate::truth_table::{BinaryOp, TruthTable, MAX_VARIABLES};
use tracing::trace;

/// Result of compiling an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledExpression {
    /// Truth table indexed by the dictionary variables
    pub table: TruthTable,
    /// Variables in ascending character order
    pub dictionary: Vec<char>,
}

impl CompiledExpression {
    /// Position of a variable in the dictionary
    pub fn variable_index(&self, variable: char) -> Option<usize> {
        self.dictionary.binary_search(&variable).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Variable(char),
    Not,
    Open,
    Close,
    Binary(BinaryOp),
}

#[derive(Debug, Clone, Copy)]
enum Join {
    Negate,
    Binary(BinaryOp),
}

/// One pending operand with the operator that joins it to the frame below
#[derive(Debug)]
struct Frame {
    join: Option<Join>,
    priority: u32,
    operand: Option<TruthTable>,
}

const NOT_PRIORITY: u32 = 4;
const NESTING_PRIORITY: u32 = 8;

/// Compile an expression into a truth table
pub fn compile(expression: &str) -> Result<CompiledExpression, CompileError> {
    let tokens = tokenize(expression)?;

    let mut dictionary: Vec<char> = tokens
        .iter()
        .filter_map(|(_, token)| match token {
            Token::Variable(c) => Some(*c),
            _ => None,
        })
        .collect();
    dictionary.sort_unstable();
    dictionary.dedup();

    if dictionary.is_empty() {
        return Err(CompileError::NoVariables);
    }
    if dictionary.len() > MAX_VARIABLES as usize {
        return Err(CompileError::TooManyVariables(dictionary.len()));
    }

    let variables = dictionary.len() as u8;
    let end = expression.chars().count();
    let mut stack = vec![Frame {
        join: None,
        priority: 0,
        operand: None,
    }];
    let mut depth = 0u32;
    let mut inverted = false;

    for (position, token) in tokens {
        match token {
            Token::Variable(c) => {
                let top = top_frame(&mut stack);
                if top.operand.is_some() {
                    return Err(CompileError::MissingOperator(position));
                }
                // Every variable token was collected into the dictionary
                let Ok(id) = dictionary.binary_search(&c) else {
                    return Err(CompileError::UnexpectedCharacter { ch: c, position });
                };
                top.operand = Some(TruthTable::variable(variables, id as u8, inverted));
                inverted = false;
            }
            Token::Not => inverted = !inverted,
            Token::Open => {
                if top_frame(&mut stack).operand.is_some() {
                    return Err(CompileError::MissingOperator(position));
                }
                if inverted {
                    stack.push(Frame {
                        join: Some(Join::Negate),
                        priority: NOT_PRIORITY + depth * NESTING_PRIORITY,
                        operand: None,
                    });
                    inverted = false;
                }
                depth += 1;
            }
            Token::Close => {
                if depth == 0 {
                    return Err(CompileError::UnbalancedParentheses(position));
                }
                depth -= 1;
            }
            Token::Binary(op) => {
                let op = match op.negated() {
                    Some(negated) if inverted => {
                        inverted = false;
                        negated
                    }
                    _ => op,
                };
                let priority = op.priority() + depth * NESTING_PRIORITY;
                fold(&mut stack, priority, position)?;
                if top_frame(&mut stack).operand.is_none() {
                    return Err(CompileError::MissingOperand(position));
                }
                stack.push(Frame {
                    join: Some(Join::Binary(op)),
                    priority,
                    operand: None,
                });
            }
        }
    }

    if depth != 0 {
        return Err(CompileError::UnbalancedParentheses(end));
    }
    if inverted {
        return Err(CompileError::MissingOperand(end));
    }
    fold(&mut stack, 0, end)?;

    let table = stack
        .pop()
        .and_then(|frame| frame.operand)
        .ok_or(CompileError::MissingOperand(end))?;

    trace!(expression, variables, "Compiled expression");
    Ok(CompiledExpression { table, dictionary })
}

fn top_frame(stack: &mut Vec<Frame>) -> &mut Frame {
    if stack.is_empty() {
        stack.push(Frame {
            join: None,
            priority: 0,
            operand: None,
        });
    }
    let last = stack.len() - 1;
    &mut stack[last]
}

/// Collapse every frame whose priority is at least `priority` into the
/// frame below it
fn fold(stack: &mut Vec<Frame>, priority: u32, position: usize) -> Result<(), CompileError> {
    while stack.len() > 1 {
        if stack[stack.len() - 1].priority < priority {
            break;
        }
        let Some(frame) = stack.pop() else { break };
        let mut operand = frame
            .operand
            .ok_or(CompileError::MissingOperand(position))?;
        let below = top_frame(stack);

        match frame.join {
            Some(Join::Negate) => {
                if below.operand.is_some() {
                    return Err(CompileError::MissingOperator(position));
                }
                operand.negate();
                below.operand = Some(operand);
            }
            Some(Join::Binary(op)) => {
                let left = below
                    .operand
                    .as_mut()
                    .ok_or(CompileError::MissingOperand(position))?;
                left.combine(op, &operand);
            }
            None => below.operand = Some(operand),
        }
    }
    Ok(())
}

fn tokenize(expression: &str) -> Result<Vec<(usize, Token)>, CompileError> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let position = i;
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        i += 1;

        let token = match c {
            c if c.is_ascii_alphanumeric() => Token::Variable(c),
            c if c.is_whitespace() => continue,
            '!' | '~' => Token::Not,
            '(' => Token::Open,
            ')' => Token::Close,
            '&' | '*' => Token::Binary(BinaryOp::And),
            '|' | '+' => Token::Binary(BinaryOp::Or),
            '^' => Token::Binary(BinaryOp::Xor),
            '>' if next == Some('=') => {
                i += 1;
                Token::Binary(BinaryOp::GreaterEq)
            }
            '>' => Token::Binary(BinaryOp::Greater),
            '<' if next == Some('=') => {
                i += 1;
                Token::Binary(BinaryOp::LessEq)
            }
            '<' => Token::Binary(BinaryOp::Less),
            '=' | '-' if next == Some('>') => {
                i += 1;
                Token::Binary(BinaryOp::LessEq)
            }
            '=' => Token::Binary(BinaryOp::Xnor),
            ch => return Err(CompileError::UnexpectedCharacter { ch, position }),
        };

        if let Token::Binary(_) = token {
            // `&&`, `||`, `==`, `>==`: the run counts as one operator
            let last = chars[i - 1];
            while i < chars.len() && chars[i] == last {
                i += 1;
            }
        }
        tokens.push((position, token));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(expression: &str) -> u64 {
        compile(expression).unwrap().table.words()[0]
    }

    #[test]
    fn test_basic_operators() {
        assert_eq!(bits("a&b"), 0b1000);
        assert_eq!(bits("a|b"), 0b1110);
        assert_eq!(bits("!a"), 0b01);
        assert_eq!(bits("a^b"), 0b0110);
        assert_eq!(bits("(a|b)&!c"), 0b0101_0100);
    }

    #[test]
    fn test_operator_aliases() {
        assert_eq!(bits("a*b"), bits("a&b"));
        assert_eq!(bits("a+b"), bits("a|b"));
        assert_eq!(bits("~a"), bits("!a"));
        assert_eq!(bits("a&&b"), bits("a&b"));
        assert_eq!(bits("a||b"), bits("a|b"));
        assert_eq!(bits("a==b"), bits("a=b"));
    }

    #[test]
    fn test_negated_operators() {
        assert_eq!(bits("a!&b"), 0b0111);
        assert_eq!(bits("a!|b"), 0b0001);
        assert_eq!(bits("a!^b"), 0b1001);
        assert_eq!(bits("a!=b"), 0b0110);
    }

    #[test]
    fn test_comparisons_and_implication() {
        // index = a*2 + b
        assert_eq!(bits("a>b"), 0b0100);
        assert_eq!(bits("a>=b"), 0b1101);
        assert_eq!(bits("a<b"), 0b0010);
        assert_eq!(bits("a<=b"), 0b1011);
        assert_eq!(bits("a->b"), 0b1011);
        assert_eq!(bits("a=>b"), 0b1011);
    }

    #[test]
    fn test_precedence() {
        // a | (b & c)
        assert_eq!(bits("a|b&c"), 0b1111_1000);
        // (a | b) & c
        assert_eq!(bits("(a|b)&c"), 0b1010_1000);
        // not binds tighter than and
        assert_eq!(bits("!a&b"), 0b0010);
        assert_eq!(bits("!(a&b)"), 0b0111);
    }

    #[test]
    fn test_variables_take_dictionary_positions() {
        // dictionary [a, c]: a is the high index bit, c the low one
        assert_eq!(bits("c&!a"), 0b0010);
        assert_eq!(bits("!c&a"), 0b0100);
    }

    #[test]
    fn test_dictionary_is_sorted() {
        let compiled = compile("z & 1 | B").unwrap();
        assert_eq!(compiled.dictionary, vec!['1', 'B', 'z']);
        assert_eq!(compiled.variable_index('z'), Some(2));
    }

    #[test]
    fn test_repeated_variable() {
        assert_eq!(bits("a&a"), 0b10);
        assert_eq!(bits("a^a"), 0b00);
    }

    #[test]
    fn test_too_many_variables() {
        let expression: String = ('a'..='z')
            .chain('A'..='G')
            .map(String::from)
            .collect::<Vec<_>>()
            .join("|");
        assert_eq!(
            compile(&expression),
            Err(CompileError::TooManyVariables(33))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(compile(""), Err(CompileError::NoVariables));
        assert_eq!(compile("()"), Err(CompileError::NoVariables));
        assert!(matches!(
            compile("(a&b"),
            Err(CompileError::UnbalancedParentheses(_))
        ));
        assert!(matches!(
            compile("a&b)"),
            Err(CompileError::UnbalancedParentheses(3))
        ));
        assert!(matches!(compile("a&"), Err(CompileError::MissingOperand(_))));
        assert!(matches!(compile("&a"), Err(CompileError::MissingOperand(0))));
        assert!(matches!(compile("ab"), Err(CompileError::MissingOperator(1))));
        assert!(matches!(
            compile("a # b"),
            Err(CompileError::UnexpectedCharacter { ch: '#', position: 2 })
        ));
    }
}
