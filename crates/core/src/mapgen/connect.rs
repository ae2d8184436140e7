//! Cross-line path connection: links the main line end-to-end, then
//! recursively sprouts extra connections into sibling lines.

use rand_chacha::ChaCha8Rng;

use crate::geom::Segment;
use crate::graph::{Direction, NodeGraph, NodeId};

use super::lines::LineSet;
use super::restriction::MapRestriction;
use super::rng::{pick, unit_f32};

/// Candidate connection segments must keep this clearance from nodes that
/// are not one of their own endpoints.
const NEAR_NODE_RADIUS: f32 = 100.0;

/// Hard bound on link recursion, on top of the stop-at-main-line rule.
const MAX_LINK_DEPTH: usize = 8;

/// Connects the main line sequentially, then rolls per-node extra
/// connections that recurse across sibling lines.
pub(super) fn connect_paths(
    graph: &mut NodeGraph,
    line_set: &LineSet,
    rng: &mut ChaCha8Rng,
    restriction: &MapRestriction,
) {
    let main = &line_set.lines[0];
    for pair in main.nodes.windows(2) {
        graph.connect(pair[0], pair[1], Direction::Right);
    }

    let context = LinkContext { line_set, split_probability: restriction.split_probability };
    for (node_index, &id) in main.nodes.iter().enumerate() {
        let wanted = rolled_connection_count(rng, context.split_probability, node_index);
        for _ in 0..wanted {
            try_link(graph, &context, LinkSource { line_index: 0, node_index, id }, rng, 0);
        }
    }
}

struct LinkContext<'a> {
    line_set: &'a LineSet,
    split_probability: f32,
}

#[derive(Clone, Copy)]
struct LinkSource {
    line_index: usize,
    node_index: usize,
    id: NodeId,
}

/// `floor(min(sqrt(u)·p·3 + 0.8, 3))` with `p` boosted for early nodes,
/// biasing the map toward branching near its start.
fn rolled_connection_count(
    rng: &mut ChaCha8Rng,
    split_probability: f32,
    node_index: usize,
) -> usize {
    let p = split_probability + (0.3 - node_index as f32 / 10.0).max(0.0);
    let rolled = unit_f32(rng).sqrt() * p * 3.0 + 0.8;
    rolled.min(3.0).floor() as usize
}

/// Attempts one extra connection out of `source`, then recurses from the
/// node it reached with a freshly rolled count.
fn try_link(
    graph: &mut NodeGraph,
    context: &LinkContext<'_>,
    source: LinkSource,
    rng: &mut ChaCha8Rng,
    depth: usize,
) {
    if depth >= MAX_LINK_DEPTH || graph.node(source.id).degree() >= 4 {
        return;
    }

    let line = &context.line_set.lines[source.line_index];
    let mut options: Vec<(Direction, usize)> = Vec::new();
    if let Some(up) = line.up {
        if graph.node(source.id).slot_is_free(Direction::Up) {
            options.push((Direction::Up, up));
        }
    }
    if let Some(down) = line.down {
        if graph.node(source.id).slot_is_free(Direction::Down) {
            options.push((Direction::Down, down));
        }
    }
    // RIGHT re-enters the node's own line ahead of it; never at the last
    // node, and LEFT is never offered.
    if source.node_index + 1 < line.nodes.len()
        && graph.node(source.id).slot_is_free(Direction::Right)
    {
        options.push((Direction::Right, source.line_index));
    }
    if options.is_empty() {
        return;
    }

    let (direction, target_line) = *pick(rng, &options);
    let candidates = nearby_targets(graph, context.line_set, target_line, source.id);
    if candidates.is_empty() {
        return;
    }

    let chosen = *pick(rng, &candidates);
    if !graph.connect(source.id, chosen, direction) {
        return;
    }
    if target_line == 0 && depth > 0 {
        return;
    }

    let Some(chosen_index) =
        context.line_set.lines[target_line].nodes.iter().position(|&node| node == chosen)
    else {
        return;
    };
    let wanted = rolled_connection_count(rng, context.split_probability, chosen_index);
    let next = LinkSource { line_index: target_line, node_index: chosen_index, id: chosen };
    for _ in 0..wanted {
        try_link(graph, context, next, rng, depth + 1);
    }
}

/// Up to the 3 nearest unconnected nodes on the target line ahead of the
/// source's x position, minus any whose connecting segment would brush
/// within [`NEAR_NODE_RADIUS`] of an unrelated node.
fn nearby_targets(
    graph: &NodeGraph,
    line_set: &LineSet,
    target_line: usize,
    from: NodeId,
) -> Vec<NodeId> {
    let origin = graph.node(from).position;
    let mut candidates: Vec<NodeId> = line_set.lines[target_line]
        .nodes
        .iter()
        .copied()
        .filter(|&candidate| {
            candidate != from
                && graph.contains(candidate)
                && graph.node(candidate).position.x > origin.x
                && graph.node(candidate).degree() < 4
                && !graph.connected(from, candidate)
        })
        .collect();
    candidates.sort_by(|&a, &b| {
        graph
            .node(a)
            .position
            .distance_to(origin)
            .total_cmp(&graph.node(b).position.distance_to(origin))
    });
    candidates.truncate(3);
    candidates.retain(|&candidate| {
        segment_is_clear(graph, from, candidate)
    });
    candidates
}

fn segment_is_clear(graph: &NodeGraph, from: NodeId, to: NodeId) -> bool {
    let segment = Segment::new(graph.node(from).position, graph.node(to).position);
    graph.ids().all(|other| {
        other == from
            || other == to
            || segment.distance_to_point(graph.node(other).position) >= NEAR_NODE_RADIUS
    })
}
