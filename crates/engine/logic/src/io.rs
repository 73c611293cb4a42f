//! Binary rule sections
//!
//! All integers are little-endian. A rule record is:
//!
//! ```text
//! u8        operand count k
//! k x u16   operand IDs
//! bytes     truth table, max(1, 2^k / 8) bytes
//! u64       operand kinds, 2 bits per operand (slot j at bits 2j)
//! u8        action count n
//! n x u32   action IDs
//! n x u32   cumulative end offset of each action's arguments
//! bytes     argument buffer (length = last end offset)
//! ```
//!
//! A rule section is a `u8` rule count followed by that many records.
//!
//! Operand slot `j` of a record supplies bit `j` of the table index, so
//! slots are stored least significant first. [`Rule`] keeps its operands
//! most significant first; the two orders are swapped here.

use crate::rule::{MAX_ACTIONS, MAX_OPERANDS};
use crate::{Error, Operand, Result, Rule, TruthTable};
use tracing::debug;

/// Bounds-checked little-endian cursor over a byte slice
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, offset: 0 }
    }

    /// Current read position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check whether all bytes were consumed
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Read `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or(Error::Truncated {
            expected_bytes: usize::MAX,
            available_bytes: self.data.len(),
        })?;
        if end > self.data.len() {
            return Err(Error::Truncated {
                expected_bytes: end,
                available_bytes: self.data.len(),
            });
        }
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a 2-byte little-endian unsigned integer
    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a 4-byte little-endian unsigned integer
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read an 8-byte little-endian unsigned integer
    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }
}

/// Read one rule record
pub fn read_rule(reader: &mut ByteReader<'_>) -> Result<Rule> {
    let count = reader.read_u8()? as usize;
    if count > MAX_OPERANDS {
        return Err(Error::CorruptData(format!(
            "rule has {count} operands (at most {MAX_OPERANDS})"
        )));
    }

    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(reader.read_u16_le()?);
    }

    let table_len = TruthTable::byte_len(count as u8);
    let table = TruthTable::from_bytes(count as u8, reader.read_bytes(table_len)?)?;

    let tags = reader.read_u64_le()?;
    let operands = ids
        .into_iter()
        .enumerate()
        .map(|(slot, id)| Operand::from_tag(((tags >> (2 * slot)) & 0x3) as u8, id))
        .rev()
        .collect();

    let action_count = reader.read_u8()? as usize;
    let mut action_ids = Vec::with_capacity(action_count);
    for _ in 0..action_count {
        action_ids.push(reader.read_u32_le()?);
    }
    let mut arg_ends = Vec::with_capacity(action_count);
    for _ in 0..action_count {
        arg_ends.push(reader.read_u32_le()?);
    }
    let args_len = arg_ends.last().copied().unwrap_or(0) as usize;
    let args = reader.read_bytes(args_len)?.to_vec();

    Rule::from_parts(operands, table, action_ids, arg_ends, args)
}

/// Append one rule record
pub fn write_rule(rule: &Rule, out: &mut Vec<u8>) -> Result<()> {
    let operands = rule.operands();
    if operands.len() > MAX_OPERANDS {
        return Err(Error::TooManyOperands(operands.len()));
    }
    if rule.action_count() > MAX_ACTIONS {
        return Err(Error::TooManyActions(rule.action_count()));
    }

    out.push(operands.len() as u8);
    for operand in operands.iter().rev() {
        out.extend_from_slice(&operand.id().to_le_bytes());
    }
    out.extend_from_slice(&rule.table().to_bytes());

    let tags = operands
        .iter()
        .rev()
        .enumerate()
        .fold(0u64, |tags, (slot, operand)| {
            tags | (u64::from(operand.tag()) << (2 * slot))
        });
    out.extend_from_slice(&tags.to_le_bytes());

    out.push(rule.action_count() as u8);
    for id in rule.action_ids() {
        out.extend_from_slice(&id.to_le_bytes());
    }
    for end in rule.arg_ends() {
        out.extend_from_slice(&end.to_le_bytes());
    }
    out.extend_from_slice(rule.args());
    Ok(())
}

/// Decode a rule section
pub fn decode_rules(data: &[u8]) -> Result<Vec<Rule>> {
    let mut reader = ByteReader::new(data);
    let count = reader.read_u8()? as usize;
    let mut rules = Vec::with_capacity(count);
    for _ in 0..count {
        rules.push(read_rule(&mut reader)?);
    }
    if !reader.is_at_end() {
        return Err(Error::CorruptData(format!(
            "{} trailing bytes after {} rules",
            reader.remaining(),
            count
        )));
    }
    debug!(rules = count, bytes = data.len(), "Decoded rule section");
    Ok(rules)
}

/// Encode a rule section
pub fn encode_rules(rules: &[Rule]) -> Result<Vec<u8>> {
    let count = u8::try_from(rules.len())
        .map_err(|_| Error::CorruptData(format!("{} rules in one section (at most 255)", rules.len())))?;
    let mut out = vec![count];
    for rule in rules {
        write_rule(rule, &mut out)?;
    }
    Ok(out)
}
