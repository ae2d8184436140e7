//! Branch-line growth: constrained random walks producing the main line
//! and its recursive up/down sibling lines.

use std::collections::VecDeque;
use std::f32::consts::PI;

use rand_chacha::ChaCha8Rng;

use crate::geom::Point;
use crate::graph::{NodeGraph, NodeId};

use super::GenerateError;
use super::restriction::MapRestriction;
use super::rng::{range_f32, range_usize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Side {
    Up,
    Down,
}

/// One generated line: an ordered node sequence plus links to at most one
/// sibling line on each side.
pub(super) struct Line {
    pub(super) nodes: Vec<NodeId>,
    pub(super) up: Option<usize>,
    pub(super) down: Option<usize>,
}

/// All lines of a map; index 0 is always the main line.
pub(super) struct LineSet {
    pub(super) lines: Vec<Line>,
}

/// Grows the main line and breadth-first up/down branches until the line
/// budget is spent, inserting every point into the node arena.
pub(super) fn build_lines(
    graph: &mut NodeGraph,
    rng: &mut ChaCha8Rng,
    restriction: &MapRestriction,
) -> Result<LineSet, GenerateError> {
    let main_points = walk_main_line(rng, restriction);
    if main_points.len() < 2 {
        return Err(GenerateError::NoUsableNodes);
    }

    let mut lines = vec![insert_line(graph, &main_points)];
    let mut pending = VecDeque::from([0_usize]);
    while let Some(parent_index) = pending.pop_front() {
        for side in [Side::Up, Side::Down] {
            if lines.len() >= restriction.max_lines {
                break;
            }
            let parent_length = lines[parent_index].nodes.len();
            if parent_length <= 2 {
                continue;
            }
            let parent_points: Vec<Point> = lines[parent_index]
                .nodes
                .iter()
                .map(|&id| graph.node(id).position)
                .collect();
            let points =
                walk_branch_line(rng, restriction, &parent_points, side, parent_length - 1);
            let child_index = lines.len();
            lines.push(insert_line(graph, &points));
            match side {
                Side::Up => lines[parent_index].up = Some(child_index),
                Side::Down => lines[parent_index].down = Some(child_index),
            }
            pending.push_back(child_index);
        }
    }

    Ok(LineSet { lines })
}

fn insert_line(graph: &mut NodeGraph, points: &[Point]) -> Line {
    Line {
        nodes: points.iter().map(|&point| graph.insert(point)).collect(),
        up: None,
        down: None,
    }
}

/// Unconstrained wandering walk from the origin. The drawn node count is
/// exact: the last node is forced back to y = 0 when the walk drifted, or
/// takes one more plain step when it already ended near the axis.
fn walk_main_line(rng: &mut ChaCha8Rng, restriction: &MapRestriction) -> Vec<Point> {
    let count = range_usize(rng, restriction.min_nodes, restriction.max_nodes);
    let mut points = Vec::with_capacity(count);
    let mut current = Point::ZERO;
    points.push(current);

    while points.len() + 1 < count {
        let step = random_step(rng, restriction);
        let dy = if (current.y + step.y).abs() > restriction.max_width * 0.5 {
            -step.y
        } else {
            step.y
        };
        current = Point::new(current.x + step.x, current.y + dy);
        points.push(current);
    }

    if current.y.abs() > restriction.min_line_gap * 0.5 {
        points.push(Point::new(current.x + restriction.avg_length, 0.0));
    } else {
        let step = random_step(rng, restriction);
        points.push(current.add(step));
    }
    points
}

/// Same random steps as the main line, but every point is clamped to stay
/// on the correct side of the parent line's local extremum plus the
/// minimum gap; violations are re-rolled to a random offset beyond the
/// bound.
fn walk_branch_line(
    rng: &mut ChaCha8Rng,
    restriction: &MapRestriction,
    parent: &[Point],
    side: Side,
    count: usize,
) -> Vec<Point> {
    let start_x = parent[0].x + restriction.avg_length * 0.5;
    let start_y = offset_from(
        side_bound(parent, side, start_x, restriction),
        side,
        range_f32(rng, 0.0, restriction.min_line_gap * 0.5),
    );
    let mut current = Point::new(start_x, start_y);
    let mut points = Vec::with_capacity(count);
    points.push(current);

    while points.len() < count {
        let step = random_step(rng, restriction);
        let x = current.x + step.x;
        let mut y = current.y + step.y;
        let bound = side_bound(parent, side, x, restriction);
        let violates = match side {
            Side::Up => y < bound,
            Side::Down => y > bound,
        };
        if violates {
            y = offset_from(bound, side, range_f32(rng, 0.0, restriction.min_line_gap));
        }
        current = Point::new(x, y);
        points.push(current);
    }
    points
}

/// Random step vector: skewed short-biased length, heading within the
/// configured spread of straight ahead.
fn random_step(rng: &mut ChaCha8Rng, restriction: &MapRestriction) -> Point {
    let k = range_usize(rng, 1, 4) as f32;
    let multiplier = k * k * (k * range_f32(rng, 0.2, 1.05)) / 50.0 + 1.0;
    let length = restriction.avg_length * multiplier;
    let spread = (1.0 - restriction.max_angle_percent) * 0.5 * PI;
    let heading = range_f32(rng, -spread, spread);
    Point::new(length * heading.cos(), length * heading.sin())
}

/// The parent line's extreme y near `x` (whole line when the scan window
/// is empty), pushed outward by the minimum line gap.
fn side_bound(parent: &[Point], side: Side, x: f32, restriction: &MapRestriction) -> f32 {
    let windowed = extreme_y(
        parent.iter().filter(|point| (point.x - x).abs() <= restriction.line_scan_range),
        side,
    );
    let base = match windowed {
        Some(y) => y,
        None => extreme_y(parent.iter(), side).unwrap_or(0.0),
    };
    offset_from(base, side, restriction.min_line_gap)
}

fn extreme_y<'a>(points: impl Iterator<Item = &'a Point>, side: Side) -> Option<f32> {
    points.map(|point| point.y).reduce(|best, y| match side {
        Side::Up => best.max(y),
        Side::Down => best.min(y),
    })
}

fn offset_from(bound: f32, side: Side, extra: f32) -> f32 {
    match side {
        Side::Up => bound + extra,
        Side::Down => bound - extra,
    }
}
