//! Axis-aligned rectangles used for node footprints and decoration bounds.

use serde::{Deserialize, Serialize};

use super::point::Point;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Point, width: f32, height: f32) -> Self {
        let half = Point::new(width * 0.5, height * 0.5);
        Self { min: center.sub(half), max: center.add(half) }
    }

    /// Smallest rectangle covering all points, or `None` for an empty set.
    pub fn around(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut bounds: Option<Rect> = None;
        for point in points {
            bounds = Some(match bounds {
                None => Rect { min: point, max: point },
                Some(rect) => Rect {
                    min: Point::new(rect.min.x.min(point.x), rect.min.y.min(point.y)),
                    max: Point::new(rect.max.x.max(point.x), rect.max.y.max(point.y)),
                },
            });
        }
        bounds
    }

    pub fn padded(self, margin: f32) -> Self {
        let pad = Point::new(margin, margin);
        Self { min: self.min.sub(pad), max: self.max.add(pad) }
    }

    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn area(self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(self) -> Point {
        self.min.add(self.max).scale(0.5)
    }

    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn intersects(self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn corners(self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}
