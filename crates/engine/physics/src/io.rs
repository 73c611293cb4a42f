//! Binary group and collision rule sections
//!
//! All integers are little-endian.
//!
//! ```text
//! group section            collision rule section
//! u16  group count         u16  rule count
//! per group:               per rule:
//!   u16      element count   u16  group1
//!   n x u32  element index   u16  group2
//! ```

use crate::{CollisionRule, ElementGroup, Error, Result};
use logic::io::ByteReader;
use tracing::debug;

/// Read one group record
pub fn read_group(reader: &mut ByteReader<'_>) -> Result<ElementGroup> {
    let count = reader.read_u16_le()? as usize;
    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        elements.push(reader.read_u32_le()?);
    }
    Ok(ElementGroup { elements })
}

/// Append one group record
pub fn write_group(group: &ElementGroup, out: &mut Vec<u8>) -> Result<()> {
    let count = u16::try_from(group.len()).map_err(|_| {
        Error::CorruptData(format!("group has {} elements (at most 65535)", group.len()))
    })?;
    out.extend_from_slice(&count.to_le_bytes());
    for element in &group.elements {
        out.extend_from_slice(&element.to_le_bytes());
    }
    Ok(())
}

/// Decode a group section
pub fn decode_groups(data: &[u8]) -> Result<Vec<ElementGroup>> {
    let mut reader = ByteReader::new(data);
    let count = reader.read_u16_le()? as usize;
    let mut groups = Vec::with_capacity(count);
    for _ in 0..count {
        groups.push(read_group(&mut reader)?);
    }
    expect_end(&reader, count, "groups")?;
    debug!(groups = count, bytes = data.len(), "Decoded group section");
    Ok(groups)
}

/// Encode a group section
pub fn encode_groups(groups: &[ElementGroup]) -> Result<Vec<u8>> {
    let mut out = section_header(groups.len(), "groups")?;
    for group in groups {
        write_group(group, &mut out)?;
    }
    Ok(out)
}

/// Decode a collision rule section
pub fn decode_collision_rules(data: &[u8]) -> Result<Vec<CollisionRule>> {
    let mut reader = ByteReader::new(data);
    let count = reader.read_u16_le()? as usize;
    let mut rules = Vec::with_capacity(count);
    for _ in 0..count {
        let group1 = reader.read_u16_le()?;
        let group2 = reader.read_u16_le()?;
        rules.push(CollisionRule { group1, group2 });
    }
    expect_end(&reader, count, "collision rules")?;
    Ok(rules)
}

/// Encode a collision rule section
pub fn encode_collision_rules(rules: &[CollisionRule]) -> Result<Vec<u8>> {
    let mut out = section_header(rules.len(), "collision rules")?;
    for rule in rules {
        out.extend_from_slice(&rule.group1.to_le_bytes());
        out.extend_from_slice(&rule.group2.to_le_bytes());
    }
    Ok(out)
}

fn section_header(len: usize, what: &str) -> Result<Vec<u8>> {
    let count = u16::try_from(len)
        .map_err(|_| Error::CorruptData(format!("{len} {what} in one section (at most 65535)")))?;
    Ok(count.to_le_bytes().to_vec())
}

fn expect_end(reader: &ByteReader<'_>, count: usize, what: &str) -> Result<()> {
    if reader.is_at_end() {
        return Ok(());
    }
    Err(Error::CorruptData(format!(
        "{} trailing bytes after {count} {what}",
        reader.remaining()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_layout() {
        let groups = vec![ElementGroup::new([1, 0x0102_0304]), ElementGroup::default()];
        let bytes = encode_groups(&groups).unwrap();
        assert_eq!(
            bytes,
            vec![2, 0, 2, 0, 1, 0, 0, 0, 4, 3, 2, 1, 0, 0]
        );
        assert_eq!(decode_groups(&bytes).unwrap(), groups);
    }

    #[test]
    fn test_collision_rule_layout() {
        let rules = vec![CollisionRule::new(1, 2), CollisionRule::new(0x0300, 0)];
        let bytes = encode_collision_rules(&rules).unwrap();
        assert_eq!(bytes, vec![2, 0, 1, 0, 2, 0, 0, 3, 0, 0]);
        assert_eq!(decode_collision_rules(&bytes).unwrap(), rules);
    }

    #[test]
    fn test_truncated_group() {
        // Claims three elements, carries one
        let result = decode_groups(&[1, 0, 3, 0, 9, 0, 0, 0]);
        assert!(matches!(
            result,
            Err(Error::Truncated {
                expected_bytes: 12,
                available_bytes: 8
            })
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        assert!(matches!(
            decode_collision_rules(&[0, 0, 5]),
            Err(Error::CorruptData(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(decode_groups(&[]), Err(Error::Truncated { .. })));
    }
}
