//! Geographic to minimap pixel projection.

/// North-up, aspect-preserving track projection.
pub mod track;

/// Pixel coordinate of one retained sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectedPoint {
    /// Horizontal pixel, increasing to the right.
    pub x: i32,
    /// Vertical pixel, increasing downward.
    pub y: i32,
}

impl ProjectedPoint {
    /// Pixel as a floating point position for drawing.
    pub fn to_point(self) -> crate::foundation::core::Point {
        crate::foundation::core::Point::new(f64::from(self.x), f64::from(self.y))
    }
}
