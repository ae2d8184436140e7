//! Road segments: intersection tests, safety-margin extension, and the
//! oriented rectangle footprint a road occupies in the world.

use super::point::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn delta(self) -> Point {
        self.end.sub(self.start)
    }

    pub fn length(self) -> f32 {
        self.delta().length()
    }

    pub fn angle(self) -> f32 {
        let delta = self.delta();
        delta.y.atan2(delta.x)
    }

    /// True when the segments have a bit-identical endpoint. Edges meeting
    /// at a shared node never count as a crossing.
    pub fn shares_endpoint(self, other: &Segment) -> bool {
        self.start.bits_eq(other.start)
            || self.start.bits_eq(other.end)
            || self.end.bits_eq(other.start)
            || self.end.bits_eq(other.end)
    }

    /// Intersection point strictly inside the open interior of both
    /// segments. Endpoint touches and parallel overlaps return `None`.
    pub fn intersection(self, other: &Segment) -> Option<Point> {
        let (t, u) = self.intersection_params(other)?;
        if t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0 {
            Some(self.start.add(self.delta().scale(t)))
        } else {
            None
        }
    }

    /// Crossing test used by the intersection resolver: both segments are
    /// extended outward by `margin` before the parametric test, and the
    /// resulting point must still lie strictly inside both *original*
    /// segments' x-ranges.
    pub fn crossing_with_margin(self, other: &Segment, margin: f32) -> Option<Point> {
        let wide_self = self.extended(margin);
        let wide_other = other.extended(margin);
        let (t, u) = wide_self.intersection_params(&wide_other)?;
        if t <= 0.0 || t >= 1.0 || u <= 0.0 || u >= 1.0 {
            return None;
        }
        let point = wide_self.start.add(wide_self.delta().scale(t));
        if self.x_range_contains(point.x) && other.x_range_contains(point.x) {
            Some(point)
        } else {
            None
        }
    }

    fn x_range_contains(self, x: f32) -> bool {
        let lo = self.start.x.min(self.end.x);
        let hi = self.start.x.max(self.end.x);
        x > lo && x < hi
    }

    fn intersection_params(self, other: &Segment) -> Option<(f32, f32)> {
        let d1 = self.delta();
        let d2 = other.delta();
        let denom = d1.cross(d2);
        if denom == 0.0 {
            return None;
        }
        let offset = other.start.sub(self.start);
        Some((offset.cross(d2) / denom, offset.cross(d1) / denom))
    }

    /// Segment pushed outward by `distance` on each end along its own
    /// direction. Degenerate segments are returned unchanged.
    pub fn extended(self, distance: f32) -> Segment {
        match self.delta().unit() {
            Some(unit) => Segment {
                start: self.start.sub(unit.scale(distance)),
                end: self.end.add(unit.scale(distance)),
            },
            None => self,
        }
    }

    /// Shortest distance from `point` to any point of the segment.
    pub fn distance_to_point(self, point: Point) -> f32 {
        let delta = self.delta();
        let length_sq = delta.dot(delta);
        if length_sq == 0.0 {
            return self.start.distance_to(point);
        }
        let t = (point.sub(self.start).dot(delta) / length_sq).clamp(0.0, 1.0);
        self.start.add(delta.scale(t)).distance_to(point)
    }

    /// Corners of the rectangle this road physically occupies at the given
    /// total width, for collision tests against decorations.
    pub fn footprint(self, width: f32) -> [Point; 4] {
        let half = width * 0.5;
        let normal = match self.delta().unit() {
            Some(unit) => Point::new(-unit.y, unit.x).scale(half),
            None => Point::new(0.0, half),
        };
        [
            self.start.add(normal),
            self.end.add(normal),
            self.end.sub(normal),
            self.start.sub(normal),
        ]
    }
}

/// Separating-axis overlap test for two convex quadrilaterals.
pub fn quads_overlap(a: &[Point; 4], b: &[Point; 4]) -> bool {
    !has_separating_axis(a, b) && !has_separating_axis(b, a)
}

fn has_separating_axis(edges_of: &[Point; 4], other: &[Point; 4]) -> bool {
    for i in 0..4 {
        let edge = edges_of[(i + 1) % 4].sub(edges_of[i]);
        let axis = Point::new(-edge.y, edge.x);
        let (min_a, max_a) = project(edges_of, axis);
        let (min_b, max_b) = project(other, axis);
        if max_a < min_b || max_b < min_a {
            return true;
        }
    }
    false
}

fn project(quad: &[Point; 4], axis: Point) -> (f32, f32) {
    let mut min = quad[0].dot(axis);
    let mut max = min;
    for corner in &quad[1..] {
        let value = corner.dot(axis);
        min = min.min(value);
        max = max.max(value);
    }
    (min, max)
}
