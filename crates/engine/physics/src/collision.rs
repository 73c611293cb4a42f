//! Tile-space collision primitives
//!
//! Map elements are axis-aligned rectangles on integer tile coordinates.
//! Overlap is inclusive: two boxes that share only an edge or a corner
//! still collide.

use glam::IVec2;

/// Axis-Aligned Bounding Box on integer tile coordinates
///
/// `max` is `min + size`, so a box of width 10 starting at x = 0 spans
/// x = 0..=10 for overlap purposes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Aabb {
    /// Minimum corner (smallest x, y)
    pub min: IVec2,
    /// Maximum corner (largest x, y)
    pub max: IVec2,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Create an AABB from a position and a size
    ///
    /// # Example
    /// ```
    /// use physics::Aabb;
    /// use glam::IVec2;
    ///
    /// let aabb = Aabb::from_rect(2, 3, 10, 4);
    /// assert_eq!(aabb.min, IVec2::new(2, 3));
    /// assert_eq!(aabb.max, IVec2::new(12, 7));
    /// ```
    pub fn from_rect(x: i32, y: i32, width: i32, height: i32) -> Self {
        let min = IVec2::new(x, y);
        Self::new(min, min.saturating_add(IVec2::new(width, height)))
    }

    /// Test intersection with another AABB
    ///
    /// # Returns
    /// `true` if the boxes overlap on both axes (including touching at
    /// edges or corners)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Check if a point is inside the AABB (edges included)
    pub fn contains_point(&self, point: IVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Calculate the size (extents) of the AABB
    pub fn size(&self) -> IVec2 {
        self.max - self.min
    }

    /// Move the AABB by an offset, keeping its size
    pub fn translate(&mut self, offset: IVec2) {
        self.min = self.min.saturating_add(offset);
        self.max = self.max.saturating_add(offset);
    }

    /// Create an AABB that encompasses both AABBs
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_boxes() {
        let a = Aabb::from_rect(0, 0, 10, 10);
        let b = Aabb::from_rect(5, 5, 10, 10);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_separate_boxes() {
        let a = Aabb::from_rect(0, 0, 10, 10);
        let c = Aabb::from_rect(20, 20, 5, 5);
        assert!(!a.intersects(&c));
        assert!(!c.intersects(&a));
    }

    #[test]
    fn test_touching_edges_collide() {
        let a = Aabb::from_rect(0, 0, 10, 10);
        assert!(a.intersects(&Aabb::from_rect(10, 0, 5, 5)));
        assert!(a.intersects(&Aabb::from_rect(10, 10, 1, 1)));
        assert!(!a.intersects(&Aabb::from_rect(11, 0, 5, 5)));
    }

    #[test]
    fn test_separated_on_one_axis_only() {
        let a = Aabb::from_rect(0, 0, 10, 10);
        assert!(!a.intersects(&Aabb::from_rect(2, 11, 3, 3)));
        assert!(!a.intersects(&Aabb::from_rect(-5, 2, 4, 3)));
    }

    #[test]
    fn test_negative_size_is_normalized() {
        let aabb = Aabb::from_rect(10, 10, -4, -2);
        assert_eq!(aabb.min, IVec2::new(6, 8));
        assert_eq!(aabb.max, IVec2::new(10, 10));
    }

    #[test]
    fn test_contains_and_translate() {
        let mut aabb = Aabb::from_rect(0, 0, 4, 4);
        assert!(aabb.contains_point(IVec2::new(4, 0)));
        aabb.translate(IVec2::new(3, -1));
        assert_eq!(aabb, Aabb::from_rect(3, -1, 4, 4));
        assert_eq!(aabb.size(), IVec2::new(4, 4));
        assert!(!aabb.contains_point(IVec2::ZERO));
    }

    #[test]
    fn test_union() {
        let a = Aabb::from_rect(0, 0, 2, 2);
        let b = Aabb::from_rect(5, -3, 1, 1);
        assert_eq!(a.union(&b), Aabb::new(IVec2::new(0, -3), IVec2::new(6, 2)));
    }
}
