//! Axis-aligned rectangles in machine space
//!
//! Origins are top-left corners; y grows toward the front of the cabinet.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Right edge
    #[inline]
    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.x
    }

    /// Bottom edge
    #[inline]
    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Center point
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size / 2.0
    }

    /// Check if a point lies strictly inside (edges excluded)
    pub fn contains_point_strict(&self, point: Vec2) -> bool {
        point.x > self.origin.x
            && point.x < self.max_x()
            && point.y > self.origin.y
            && point.y < self.max_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_strict_excludes_edges() {
        let rect = Rect::new(Vec2::new(10.0, 20.0), Vec2::new(40.0, 32.0));
        assert!(rect.contains_point_strict(Vec2::new(11.0, 21.0)));
        assert!(rect.contains_point_strict(Vec2::new(49.5, 51.5)));
        assert!(!rect.contains_point_strict(Vec2::new(10.0, 30.0)));
        assert!(!rect.contains_point_strict(Vec2::new(50.0, 30.0)));
        assert!(!rect.contains_point_strict(Vec2::new(30.0, 20.0)));
        assert!(!rect.contains_point_strict(Vec2::new(30.0, 52.0)));
    }

    #[test]
    fn test_center() {
        let rect = Rect::new(Vec2::new(0.0, 10.0), Vec2::new(40.0, 20.0));
        assert_eq!(rect.center(), Vec2::new(20.0, 20.0));
    }
}
