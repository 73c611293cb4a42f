//! Element groups and the collision predicate
//!
//! A map lists its solid elements as colliders. Groups name subsets of
//! those colliders by index, and a collision rule pairs two groups. Rules
//! read collision rule `n` through a `Predicate(n)` operand.

use crate::Aabb;
use logic::Predicate;
use tracing::{trace, warn};

/// Ordered list of collider indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementGroup {
    pub elements: Vec<u32>,
}

impl ElementGroup {
    /// Create a group from collider indices
    pub fn new(elements: impl Into<Vec<u32>>) -> Self {
        Self {
            elements: elements.into(),
        }
    }

    /// Number of elements in the group
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the group is empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl From<Vec<u32>> for ElementGroup {
    fn from(elements: Vec<u32>) -> Self {
        Self { elements }
    }
}

/// Pair of groups whose overlap a rule can test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CollisionRule {
    pub group1: u16,
    pub group2: u16,
}

impl CollisionRule {
    /// Create a rule testing `group1` against `group2`
    pub fn new(group1: u16, group2: u16) -> Self {
        Self { group1, group2 }
    }
}

/// Colliders, groups and collision rules of one map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionMap {
    colliders: Vec<Aabb>,
    groups: Vec<ElementGroup>,
    rules: Vec<CollisionRule>,
}

impl CollisionMap {
    /// Create an empty collision map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set colliders (builder pattern)
    pub fn with_colliders(mut self, colliders: Vec<Aabb>) -> Self {
        self.colliders = colliders;
        self
    }

    /// Set groups (builder pattern)
    pub fn with_groups(mut self, groups: Vec<ElementGroup>) -> Self {
        self.groups = groups;
        self
    }

    /// Set collision rules (builder pattern)
    pub fn with_rules(mut self, rules: Vec<CollisionRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Get the colliders
    pub fn colliders(&self) -> &[Aabb] {
        &self.colliders
    }

    /// Get a mutable collider, for moving elements between ticks
    pub fn collider_mut(&mut self, index: u32) -> Option<&mut Aabb> {
        self.colliders.get_mut(index as usize)
    }

    /// Get the groups
    pub fn groups(&self) -> &[ElementGroup] {
        &self.groups
    }

    /// Get the collision rules
    pub fn rules(&self) -> &[CollisionRule] {
        &self.rules
    }

    /// Check whether any element of `group1` overlaps any element of
    /// `group2` for collision rule `rule_id`
    ///
    /// A pair naming the same collider twice is skipped, so a group tested
    /// against itself only reports overlaps between distinct elements.
    /// Unknown rules, groups or colliders evaluate to `false`.
    pub fn test(&self, rule_id: u16) -> bool {
        let Some(rule) = self.rules.get(rule_id as usize) else {
            warn!(rule_id, rules = self.rules.len(), "Unknown collision rule");
            return false;
        };
        let (Some(group1), Some(group2)) = (
            self.groups.get(rule.group1 as usize),
            self.groups.get(rule.group2 as usize),
        ) else {
            warn!(
                rule_id,
                group1 = rule.group1,
                group2 = rule.group2,
                groups = self.groups.len(),
                "Collision rule names unknown group"
            );
            return false;
        };

        for &first in &group1.elements {
            let Some(a) = self.collider(first) else {
                continue;
            };
            for &second in &group2.elements {
                if first == second {
                    continue;
                }
                let Some(b) = self.collider(second) else {
                    continue;
                };
                if a.intersects(b) {
                    trace!(rule_id, first, second, "Collision");
                    return true;
                }
            }
        }
        false
    }

    fn collider(&self, index: u32) -> Option<&Aabb> {
        let collider = self.colliders.get(index as usize);
        if collider.is_none() {
            warn!(index, colliders = self.colliders.len(), "Group names unknown collider");
        }
        collider
    }
}

impl Predicate for CollisionMap {
    fn test(&self, id: u16) -> bool {
        CollisionMap::test(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CollisionMap {
        CollisionMap::new()
            .with_colliders(vec![
                Aabb::from_rect(0, 0, 10, 10),
                Aabb::from_rect(5, 5, 10, 10),
                Aabb::from_rect(20, 20, 5, 5),
            ])
            .with_groups(vec![
                ElementGroup::new([0]),
                ElementGroup::new([1]),
                ElementGroup::new([2]),
                ElementGroup::new([0, 2]),
            ])
            .with_rules(vec![
                CollisionRule::new(0, 1),
                CollisionRule::new(0, 2),
                CollisionRule::new(0, 0),
                CollisionRule::new(3, 3),
                CollisionRule::new(0, 9),
            ])
    }

    #[test]
    fn test_overlapping_groups() {
        assert!(sample().test(0));
    }

    #[test]
    fn test_separate_groups() {
        assert!(!sample().test(1));
    }

    #[test]
    fn test_element_never_collides_with_itself() {
        let map = sample();
        assert!(!map.test(2));
        // 0 and 2 are distinct but far apart
        assert!(!map.test(3));
    }

    #[test]
    fn test_out_of_range_is_false() {
        let map = sample();
        assert!(!map.test(4));
        assert!(!map.test(100));

        let broken = map.with_groups(vec![ElementGroup::new([0, 7]), ElementGroup::new([1])]);
        assert!(broken.test(0));
        assert!(!broken.test(2));
    }

    #[test]
    fn test_moving_collider_changes_result() {
        let mut map = sample();
        map.collider_mut(2).unwrap().translate(glam::IVec2::new(-12, -12));
        assert!(map.test(1));
    }

    #[test]
    fn test_predicate_impl() {
        let map = sample();
        let predicate: &dyn Predicate = &map;
        assert!(predicate.test(0));
        assert!(!predicate.test(1));
    }
}
