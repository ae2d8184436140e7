//! Immutable 2D point/vector value type.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point { x: self.x + other.x, y: self.y + other.y }
    }

    pub fn sub(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }

    pub fn scale(self, factor: f32) -> Point {
        Point { x: self.x * factor, y: self.y * factor }
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 2D cross product, used by the segment
    /// intersection formula.
    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(self, other: Point) -> f32 {
        self.sub(other).length()
    }

    /// Unit vector in the same direction. Returns `None` for the zero
    /// vector instead of producing NaN components.
    pub fn unit(self) -> Option<Point> {
        let length = self.length();
        if length > 0.0 { Some(self.scale(1.0 / length)) } else { None }
    }

    pub fn rotated(self, radians: f32) -> Point {
        let (sin, cos) = radians.sin_cos();
        Point { x: self.x * cos - self.y * sin, y: self.x * sin + self.y * cos }
    }

    /// Exact bit-level equality. Node deduplication keys on this rather
    /// than epsilon comparison; two positions that differ in the last ulp
    /// are distinct nodes.
    pub fn bits_eq(self, other: Point) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_of_zero_vector_is_none() {
        assert_eq!(Point::ZERO.unit(), None);
        let unit = Point::new(3.0, 4.0).unit().expect("non-zero vector has a unit");
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bits_eq_distinguishes_negative_zero() {
        let positive = Point::new(0.0, 1.0);
        let negative = Point::new(-0.0, 1.0);
        assert!(positive == negative, "f32 compares -0.0 == 0.0");
        assert!(!positive.bits_eq(negative), "dedup key must be bit-exact");
    }

    #[test]
    fn rotation_by_quarter_turn_swaps_axes() {
        let rotated = Point::new(1.0, 0.0).rotated(std::f32::consts::FRAC_PI_2);
        assert!(rotated.x.abs() < 1e-6);
        assert!((rotated.y - 1.0).abs() < 1e-6);
    }
}
