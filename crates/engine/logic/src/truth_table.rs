//! Bit-packed truth tables
//!
//! A table over `n` variables holds `2^n` result bits in `u64` words. Bit `b`
//! of the table lives in word `b / 64` at bit `b % 64`, and variable `i`
//! (in dictionary order) contributes bit `n - 1 - i` of the index, so the
//! first variable is the most significant one.
//!
//! Tables with fewer than six variables still occupy one word; the bits
//! above `2^n` are kept at zero.

use crate::{Error, Result};
use std::fmt;

/// Largest number of variables a table can index
pub const MAX_VARIABLES: u8 = 32;

/// Binary operators supported by the expression compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    /// `a > b`, true when `a` is set and `b` is not
    Greater,
    /// `a >= b`
    GreaterEq,
    /// `a < b`, true when `b` is set and `a` is not
    Less,
    /// `a <= b`, which is material implication `a -> b`
    LessEq,
}

impl BinaryOp {
    /// Binding strength before parenthesis nesting is added
    pub fn priority(self) -> u32 {
        match self {
            BinaryOp::And | BinaryOp::Nand => 3,
            BinaryOp::Or | BinaryOp::Nor => 2,
            _ => 1,
        }
    }

    /// Operator produced when a `!` precedes this one, if it can be negated
    pub fn negated(self) -> Option<BinaryOp> {
        match self {
            BinaryOp::And => Some(BinaryOp::Nand),
            BinaryOp::Or => Some(BinaryOp::Nor),
            BinaryOp::Xor => Some(BinaryOp::Xnor),
            BinaryOp::Xnor => Some(BinaryOp::Xor),
            _ => None,
        }
    }

    /// Apply the operator to 64 table bits at once
    #[inline]
    pub fn apply(self, a: u64, b: u64) -> u64 {
        match self {
            BinaryOp::And => a & b,
            BinaryOp::Nand => !(a & b),
            BinaryOp::Or => a | b,
            BinaryOp::Nor => !(a | b),
            BinaryOp::Xor => a ^ b,
            BinaryOp::Xnor => !(a ^ b),
            BinaryOp::Greater => a & !b,
            BinaryOp::GreaterEq => a | !b,
            BinaryOp::Less => !a & b,
            BinaryOp::LessEq => !a | b,
        }
    }
}

/// Truth table of a boolean function over up to 32 variables
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TruthTable {
    variables: u8,
    words: Vec<u64>,
}

fn word_count(variables: u8) -> usize {
    if variables <= 6 {
        1
    } else {
        1usize << (variables - 6)
    }
}

fn tail_mask(variables: u8) -> u64 {
    if variables >= 6 {
        u64::MAX
    } else {
        (1u64 << (1u32 << variables)) - 1
    }
}

impl TruthTable {
    /// Create an all-false table
    ///
    /// # Panics
    ///
    /// Panics if `variables` exceeds [`MAX_VARIABLES`].
    pub fn new(variables: u8) -> Self {
        assert!(
            variables <= MAX_VARIABLES,
            "truth table over {variables} variables"
        );
        TruthTable {
            variables,
            words: vec![0; word_count(variables)],
        }
    }

    /// Create a constant table
    pub fn constant(variables: u8, value: bool) -> Self {
        let mut table = TruthTable::new(variables);
        if value {
            table.words.fill(u64::MAX);
            table.mask_tail();
        }
        table
    }

    /// Table of a single variable: bit `b` is set iff the variable's bit of
    /// `b` is set, or clear if `inverted`
    pub fn variable(variables: u8, id: u8, inverted: bool) -> Self {
        debug_assert!(id < variables);
        let mut table = TruthTable::new(variables);
        let shift = u32::from(variables - 1 - id);

        if shift >= 6 {
            // The variable is constant across whole words
            let word_shift = shift - 6;
            for (w, word) in table.words.iter_mut().enumerate() {
                if (w >> word_shift) & 1 == 1 {
                    *word = u64::MAX;
                }
            }
        } else {
            let mut pattern = 0u64;
            for b in 0..64u32 {
                if (b >> shift) & 1 == 1 {
                    pattern |= 1 << b;
                }
            }
            table.words.fill(pattern);
        }

        if inverted {
            table.negate();
        } else {
            table.mask_tail();
        }
        table
    }

    /// Rebuild a table from its words
    pub fn from_words(variables: u8, words: Vec<u64>) -> Result<Self> {
        if variables > MAX_VARIABLES {
            return Err(Error::TooManyOperands(variables as usize));
        }
        if words.len() != word_count(variables) {
            return Err(Error::CorruptData(format!(
                "table over {} variables needs {} words, got {}",
                variables,
                word_count(variables),
                words.len()
            )));
        }
        let mut table = TruthTable { variables, words };
        table.mask_tail();
        Ok(table)
    }

    /// Number of bytes in the serialized form: `max(1, 2^n / 8)`
    pub fn byte_len(variables: u8) -> usize {
        if variables <= 3 {
            1
        } else {
            1usize << (variables - 3)
        }
    }

    /// Rebuild a table from its little-endian byte stream
    pub fn from_bytes(variables: u8, bytes: &[u8]) -> Result<Self> {
        if variables > MAX_VARIABLES {
            return Err(Error::TooManyOperands(variables as usize));
        }
        let expected = Self::byte_len(variables);
        if bytes.len() != expected {
            return Err(Error::Truncated {
                expected_bytes: expected,
                available_bytes: bytes.len(),
            });
        }

        let mut words = vec![0u64; word_count(variables)];
        for (i, byte) in bytes.iter().enumerate() {
            words[i / 8] |= u64::from(*byte) << ((i % 8) * 8);
        }
        TruthTable::from_words(variables, words)
    }

    /// Serialize as the little-endian byte stream of the words, truncated
    /// to [`TruthTable::byte_len`]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .take(Self::byte_len(self.variables))
            .collect()
    }

    /// Get the number of variables
    pub fn variables(&self) -> u8 {
        self.variables
    }

    /// Get the number of result bits (`2^n`)
    pub fn len(&self) -> usize {
        1usize << self.variables
    }

    /// Always false; a table has at least one bit
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get the backing words
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Get the result for an index
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Set the result for an index
    pub fn set(&mut self, index: usize, value: bool) {
        let mask = 1u64 << (index % 64);
        if value {
            self.words[index / 64] |= mask;
        } else {
            self.words[index / 64] &= !mask;
        }
    }

    /// Number of indices that evaluate to true
    pub fn count_true(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Invert every result
    pub fn negate(&mut self) {
        for word in &mut self.words {
            *word = !*word;
        }
        self.mask_tail();
    }

    /// Combine with `rhs` in place: `self = self <op> rhs`
    pub fn combine(&mut self, op: BinaryOp, rhs: &TruthTable) {
        debug_assert_eq!(self.variables, rhs.variables);
        for (a, b) in self.words.iter_mut().zip(&rhs.words) {
            *a = op.apply(*a, *b);
        }
        self.mask_tail();
    }

    /// Check whether the `len` results starting at `start` all agree
    ///
    /// `len` must be a power of two and `start` a multiple of it. Returns
    /// the shared value, or `None` if the range holds both results.
    #[inline]
    pub fn uniform(&self, start: usize, len: usize) -> Option<bool> {
        debug_assert!(len.is_power_of_two() && start % len == 0);
        if len >= 64 {
            let words = &self.words[start / 64..(start + len) / 64];
            if words.iter().all(|w| *w == 0) {
                Some(false)
            } else if words.iter().all(|w| *w == u64::MAX) {
                Some(true)
            } else {
                None
            }
        } else {
            let mask = (1u64 << len) - 1;
            let bits = (self.words[start / 64] >> (start % 64)) & mask;
            if bits == 0 {
                Some(false)
            } else if bits == mask {
                Some(true)
            } else {
                None
            }
        }
    }

    /// Iterate over all results in index order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    fn mask_tail(&mut self) {
        if let Some(last) = self.words.last_mut() {
            *last &= tail_mask(self.variables);
        }
    }
}

impl fmt::Debug for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variables <= 6 {
            write!(f, "TruthTable({}: {:#b})", self.variables, self.words[0])
        } else {
            f.debug_struct("TruthTable")
                .field("variables", &self.variables)
                .field("words", &self.words.len())
                .finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_tables() {
        // a is the most significant index bit
        assert_eq!(TruthTable::variable(2, 0, false).words(), &[0b1100]);
        assert_eq!(TruthTable::variable(2, 1, false).words(), &[0b1010]);
        assert_eq!(TruthTable::variable(1, 0, true).words(), &[0b01]);
    }

    #[test]
    fn test_variable_table_across_words() {
        let table = TruthTable::variable(8, 0, false);
        assert_eq!(table.words(), &[0, 0, u64::MAX, u64::MAX]);
        assert!(!table.get(127));
        assert!(table.get(128));

        let last = TruthTable::variable(8, 7, false);
        assert!(last.words().iter().all(|w| *w == 0xAAAA_AAAA_AAAA_AAAA));
    }

    #[test]
    fn test_negate_keeps_tail_clear() {
        let mut table = TruthTable::new(2);
        table.negate();
        assert_eq!(table.words(), &[0b1111]);
        assert_eq!(table.count_true(), 4);
    }

    #[test]
    fn test_combine() {
        let mut a = TruthTable::variable(2, 0, false);
        let b = TruthTable::variable(2, 1, false);
        a.combine(BinaryOp::LessEq, &b);
        // a -> b is false only for a=1, b=0 (index 0b10)
        assert_eq!(a.words(), &[0b1011]);
    }

    #[test]
    fn test_uniform_ranges() {
        let table = TruthTable::from_words(3, vec![0b1111_0000]).unwrap();
        assert_eq!(table.uniform(0, 4), Some(false));
        assert_eq!(table.uniform(4, 4), Some(true));
        assert_eq!(table.uniform(0, 8), None);

        let wide = TruthTable::variable(7, 0, false);
        assert_eq!(wide.uniform(0, 64), Some(false));
        assert_eq!(wide.uniform(64, 64), Some(true));
        assert_eq!(wide.uniform(0, 128), None);
    }

    #[test]
    fn test_bytes() {
        let table = TruthTable::from_words(2, vec![0b0110]).unwrap();
        assert_eq!(table.to_bytes(), vec![0b0110]);

        let wide = TruthTable::variable(7, 6, false);
        let bytes = wide.to_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(TruthTable::from_bytes(7, &bytes).unwrap(), wide);
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        assert!(matches!(
            TruthTable::from_bytes(5, &[0; 3]),
            Err(Error::Truncated {
                expected_bytes: 4,
                available_bytes: 3
            })
        ));
    }

    #[test]
    fn test_from_words_masks_tail() {
        let table = TruthTable::from_words(1, vec![u64::MAX]).unwrap();
        assert_eq!(table.words(), &[0b11]);
    }
}
