//! Decoration scatter: uniform fields, radial clusters, and contagious
//! block clusters, all kept clear of nodes and road surfaces.

use std::f32::consts::{PI, TAU};

use rand_chacha::ChaCha8Rng;

use crate::geom::{Point, Rect, Segment, quads_overlap};
use crate::graph::NodeGraph;

use super::model::DecorationSet;
use super::restriction::{DecorationKind, DecorationSpec, MapRestriction};
use super::rng::{chance, range_f32, unit_f32};

/// Side length of the square kept clear around every node.
const NODE_FOOTPRINT: f32 = 80.0;

/// How far the scatter bounds extend past the outermost node.
const BOUNDS_PADDING: f32 = 150.0;

/// Cluster boundary anchors: ring points tracing the outer edge and a few
/// core points near the center.
const BORDER_ANCHORS: usize = 12;
const CORE_ANCHORS: usize = 5;

/// Scatters every configured decoration over the padded node bounds. Sets
/// come back in restriction order, each sorted back-to-front by y so
/// renderers can draw them in sequence.
pub(super) fn scatter_decorations(
    graph: &NodeGraph,
    rng: &mut ChaCha8Rng,
    restriction: &MapRestriction,
) -> Vec<DecorationSet> {
    let positions = graph.ids().map(|id| graph.node(id).position);
    let Some(bounds) = Rect::around(positions).map(|rect| rect.padded(BOUNDS_PADDING)) else {
        return Vec::new();
    };
    let roads: Vec<[Point; 4]> = graph
        .edges()
        .iter()
        .map(|&(a, b)| {
            Segment::new(graph.node(a).position, graph.node(b).position)
                .footprint(restriction.path_width)
        })
        .collect();

    restriction
        .decorations
        .iter()
        .map(|spec| scatter_one(graph, rng, bounds, &roads, spec))
        .collect()
}

fn scatter_one(
    graph: &NodeGraph,
    rng: &mut ChaCha8Rng,
    bounds: Rect,
    roads: &[[Point; 4]],
    spec: &DecorationSpec,
) -> DecorationSet {
    let mut set = DecorationSet {
        image: spec.image.clone(),
        base_width: spec.base_width,
        base_height: spec.base_height,
        instances: Vec::new(),
    };
    if spec.base_width <= 0.0 || spec.base_height <= 0.0 {
        return set;
    }

    let candidates = match spec.kind {
        DecorationKind::Uniform { density } => uniform_candidates(rng, bounds, spec, density),
        DecorationKind::SingleCluster { inner_radius, outer_radius, density, center_box } => {
            cluster_candidates(rng, bounds, spec, inner_radius, outer_radius, density, center_box)
        }
        DecorationKind::MultiCluster { block_size, cluster_probability, density } => {
            block_candidates(rng, bounds, spec, block_size, cluster_probability, density)
        }
    };

    for candidate in candidates {
        if !placement_is_clear(graph, roads, candidate, spec) {
            continue;
        }
        let scale = range_f32(rng, spec.scale_min, spec.scale_max);
        set.instances.push((candidate, scale));
    }
    set.instances.sort_by(|a, b| b.0.y.total_cmp(&a.0.y));
    set
}

fn random_point_in(rng: &mut ChaCha8Rng, bounds: Rect) -> Point {
    Point::new(
        range_f32(rng, bounds.min.x, bounds.max.x),
        range_f32(rng, bounds.min.y, bounds.max.y),
    )
}

fn footprint_count(area: f32, spec: &DecorationSpec, density: f32) -> usize {
    (area / (spec.base_width * spec.base_height) * density).max(0.0).round() as usize
}

fn uniform_candidates(
    rng: &mut ChaCha8Rng,
    bounds: Rect,
    spec: &DecorationSpec,
    density: f32,
) -> Vec<Point> {
    (0..footprint_count(bounds.area(), spec, density))
        .map(|_| random_point_in(rng, bounds))
        .collect()
}

/// One dense blob: polar samples around a random center, thinned toward
/// the rim and clipped by a jittered anchor boundary so the edge comes
/// out ragged instead of circular.
fn cluster_candidates(
    rng: &mut ChaCha8Rng,
    bounds: Rect,
    spec: &DecorationSpec,
    inner_radius: f32,
    outer_radius: f32,
    density: f32,
    center_box: Option<Rect>,
) -> Vec<Point> {
    let region = center_box.and_then(|rect| clip(rect, bounds)).unwrap_or(bounds);
    let center = random_point_in(rng, region);

    let border = anchor_ring(rng, center, BORDER_ANCHORS, outer_radius, 0.85, 1.1);
    let core = anchor_ring(rng, center, CORE_ANCHORS, inner_radius, 0.5, 1.0);
    let span = (outer_radius - inner_radius).max(1.0);

    let count = footprint_count(PI * outer_radius * outer_radius, spec, density);
    let mut candidates = Vec::new();
    for _ in 0..count {
        let angle = range_f32(rng, 0.0, TAU);
        // sqrt keeps the polar samples uniform over the disc.
        let radius = outer_radius * unit_f32(rng).sqrt();
        let candidate = center.add(Point::new(angle.cos() * radius, angle.sin() * radius));

        let falloff = ((radius - inner_radius) / span).clamp(0.0, 1.0);
        if unit_f32(rng) < falloff {
            continue;
        }
        if nearest_distance(candidate, &border) < nearest_distance(candidate, &core) {
            continue;
        }
        candidates.push(candidate);
    }
    candidates
}

fn anchor_ring(
    rng: &mut ChaCha8Rng,
    center: Point,
    count: usize,
    radius: f32,
    radius_min: f32,
    radius_max: f32,
) -> Vec<Point> {
    let slice = TAU / count as f32;
    (0..count)
        .map(|index| {
            let angle = index as f32 * slice + range_f32(rng, -slice * 0.25, slice * 0.25);
            let reach = radius * range_f32(rng, radius_min, radius_max);
            center.add(Point::new(angle.cos() * reach, angle.sin() * reach))
        })
        .collect()
}

fn nearest_distance(point: Point, anchors: &[Point]) -> f32 {
    anchors
        .iter()
        .map(|anchor| anchor.distance_to(point))
        .fold(f32::INFINITY, f32::min)
}

fn clip(rect: Rect, bounds: Rect) -> Option<Rect> {
    let min = Point::new(rect.min.x.max(bounds.min.x), rect.min.y.max(bounds.min.y));
    let max = Point::new(rect.max.x.min(bounds.max.x), rect.max.y.min(bounds.max.y));
    (min.x < max.x && min.y < max.y).then(|| Rect::new(min, max))
}

/// Jittered grid blocks marked by contagion: a block is likelier to join
/// a cluster when its left or upper neighbor already did. Candidates are
/// accepted when their nearest block center is marked.
fn block_candidates(
    rng: &mut ChaCha8Rng,
    bounds: Rect,
    spec: &DecorationSpec,
    block_size: f32,
    cluster_probability: f32,
    density: f32,
) -> Vec<Point> {
    let block = block_size.max(1.0);
    let columns = (bounds.width() / block).ceil().max(1.0) as usize;
    let rows = (bounds.height() / block).ceil().max(1.0) as usize;

    let mut centers = Vec::with_capacity(columns * rows);
    let mut marked = vec![false; columns * rows];
    let jitter = block * 0.25;
    for row in 0..rows {
        for column in 0..columns {
            centers.push(Point::new(
                bounds.min.x + (column as f32 + 0.5) * block + range_f32(rng, -jitter, jitter),
                bounds.min.y + (row as f32 + 0.5) * block + range_f32(rng, -jitter, jitter),
            ));
            let mut probability = cluster_probability;
            if column > 0 && marked[row * columns + column - 1] {
                probability += 0.3;
            }
            if row > 0 && marked[(row - 1) * columns + column] {
                probability += 0.3;
            }
            marked[row * columns + column] = chance(rng, probability.min(0.95));
        }
    }

    let count = footprint_count(bounds.area(), spec, density);
    let mut candidates = Vec::new();
    for _ in 0..count {
        let candidate = random_point_in(rng, bounds);
        let mut nearest = 0;
        let mut nearest_distance = f32::INFINITY;
        for (index, &center) in centers.iter().enumerate() {
            let distance = center.distance_to(candidate);
            if distance < nearest_distance {
                nearest = index;
                nearest_distance = distance;
            }
        }
        if marked[nearest] {
            candidates.push(candidate);
        }
    }
    candidates
}

/// A placement is clear when its base-size box overlaps no node footprint
/// and, unless the spec opts out, no road surface.
fn placement_is_clear(
    graph: &NodeGraph,
    roads: &[[Point; 4]],
    candidate: Point,
    spec: &DecorationSpec,
) -> bool {
    let foot = Rect::from_center_size(candidate, spec.base_width, spec.base_height);
    let clear_of_nodes = graph.ids().all(|id| {
        let node_box =
            Rect::from_center_size(graph.node(id).position, NODE_FOOTPRINT, NODE_FOOTPRINT);
        !node_box.intersects(&foot)
    });
    if !clear_of_nodes {
        return false;
    }
    spec.ignore_paths || roads.iter().all(|road| !quads_overlap(&foot.corners(), road))
}
