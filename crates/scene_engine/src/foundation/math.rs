//! Math utilities and types
//!
//! Provides the 2D math types used by the scene object model.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Normalize a rotation in degrees into the open interval (-360, 360)
///
/// The sign is preserved, so -90 stays -90 and 450 becomes 90.
pub fn normalize_rotation(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    degrees % 360.0
}

/// Axis-aligned rectangle centered on a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Center of the rectangle
    pub center: Vec2,
    /// Half of the width and height
    pub half_extents: Vec2,
}

impl Rect {
    /// Create a rectangle from its center and full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size.abs() * 0.5,
        }
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Check if this rectangle contains a point
    pub fn contains_point(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// Convert a vector into the `[x, y]` pair used by the persisted format
pub fn to_pair(v: Vec2) -> [f32; 2] {
    [v.x, v.y]
}

/// Build a vector from a persisted `[x, y]` pair
pub fn from_pair(pair: [f32; 2]) -> Vec2 {
    Vec2::new(pair[0], pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_normalization_keeps_sign() {
        assert_relative_eq!(normalize_rotation(450.0), 90.0);
        assert_relative_eq!(normalize_rotation(-450.0), -90.0);
        assert_relative_eq!(normalize_rotation(360.0), 0.0);
        assert_relative_eq!(normalize_rotation(-90.0), -90.0);
        assert_relative_eq!(normalize_rotation(f32::NAN), 0.0);
    }

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::from_center_size(Vec2::new(1.0, 1.0), Vec2::new(2.0, 4.0));
        assert!(rect.contains_point(Vec2::new(0.0, -1.0)));
        assert!(rect.contains_point(Vec2::new(2.0, 3.0)));
        assert!(!rect.contains_point(Vec2::new(2.5, 0.0)));
        assert_relative_eq!(rect.half_extents.x, 1.0);
        assert_relative_eq!(rect.half_extents.y, 2.0);
    }
}
