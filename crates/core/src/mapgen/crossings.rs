//! Crossing repair: drives the edge set to a fixed point with no two
//! segments intersecting away from a shared endpoint.

use std::collections::HashSet;

use rand_chacha::ChaCha8Rng;

use crate::geom::{Point, Segment};
use crate::graph::{NodeGraph, NodeId};

use super::GenerateError;
use super::rng::chance;

/// Repair budget. A pathological configuration that never reaches a
/// fixed point surfaces as an error instead of hanging.
const MAX_REPAIR_PASSES: usize = 1_000;

struct Crossing {
    first: (NodeId, NodeId),
    second: (NodeId, NodeId),
    point: Point,
}

/// Repeatedly prunes unreachable nodes, rescans all edge pairs, and
/// repairs the first crossing found, until none remain.
pub(super) fn resolve_crossings(
    graph: &mut NodeGraph,
    start: NodeId,
    main_line: &[NodeId],
    path_width: f32,
    rng: &mut ChaCha8Rng,
) -> Result<(), GenerateError> {
    let main_members: HashSet<NodeId> = main_line.iter().copied().collect();

    for _ in 0..MAX_REPAIR_PASSES {
        graph.prune_unreachable(start);
        let Some(crossing) = find_crossing(graph, path_width) else {
            return Ok(());
        };
        repair(graph, &crossing, &main_members, path_width, rng);
    }
    Err(GenerateError::RepairLimitExceeded { passes: MAX_REPAIR_PASSES })
}

/// First pair of edges that cross away from a shared endpoint, in
/// deterministic edge-list order.
fn find_crossing(graph: &NodeGraph, path_width: f32) -> Option<Crossing> {
    let edges = graph.edges();
    for (first_index, &first) in edges.iter().enumerate() {
        let first_segment = edge_segment(graph, first);
        for &second in &edges[first_index + 1..] {
            let second_segment = edge_segment(graph, second);
            if first_segment.shares_endpoint(&second_segment) {
                continue;
            }
            if let Some(point) = first_segment.crossing_with_margin(&second_segment, path_width) {
                return Some(Crossing { first, second, point });
            }
        }
    }
    None
}

fn edge_segment(graph: &NodeGraph, edge: (NodeId, NodeId)) -> Segment {
    Segment::new(graph.node(edge.0).position, graph.node(edge.1).position)
}

/// One repair step: delete the weaker conflicting edge when an existing
/// node already sits at the meeting point, otherwise splice in a fresh
/// junction node.
fn repair(
    graph: &mut NodeGraph,
    crossing: &Crossing,
    main_members: &HashSet<NodeId>,
    path_width: f32,
    rng: &mut ChaCha8Rng,
) {
    if let Some(nearby) = node_near(graph, crossing.point, path_width) {
        let doomed = edge_to_delete(crossing, main_members, nearby, rng);
        graph.disconnect(doomed.0, doomed.1);
        return;
    }

    let junction = graph.insert(crossing.point);
    for edge in [crossing.first, crossing.second] {
        graph.disconnect(edge.0, edge.1);
        graph.connect_toward(edge.0, junction);
        graph.connect_toward(junction, edge.1);
    }
}

/// Nearest node within `radius` of `point`, ties broken by insertion
/// order.
fn node_near(graph: &NodeGraph, point: Point, radius: f32) -> Option<NodeId> {
    let mut best: Option<(f32, NodeId)> = None;
    for id in graph.ids() {
        let distance = graph.node(id).position.distance_to(point);
        if distance > radius {
            continue;
        }
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, id));
        }
    }
    best.map(|(_, id)| id)
}

/// Deletion priority: keep an edge living entirely on the main line, then
/// keep the edge touching the nearby node, then coin-flip.
fn edge_to_delete(
    crossing: &Crossing,
    main_members: &HashSet<NodeId>,
    nearby: NodeId,
    rng: &mut ChaCha8Rng,
) -> (NodeId, NodeId) {
    let on_main = |edge: (NodeId, NodeId)| {
        main_members.contains(&edge.0) && main_members.contains(&edge.1)
    };
    let first_on_main = on_main(crossing.first);
    let second_on_main = on_main(crossing.second);
    if first_on_main != second_on_main {
        return if first_on_main { crossing.second } else { crossing.first };
    }

    let touches = |edge: (NodeId, NodeId)| edge.0 == nearby || edge.1 == nearby;
    let first_touches = touches(crossing.first);
    let second_touches = touches(crossing.second);
    if first_touches != second_touches {
        return if first_touches { crossing.second } else { crossing.first };
    }

    if chance(rng, 0.5) { crossing.first } else { crossing.second }
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use crate::graph::Direction;

    use super::*;

    fn crossing_fixture() -> (NodeGraph, NodeId, Vec<NodeId>) {
        // Two long edges forming an X, hung off a short main chain so
        // everything stays reachable from the start node.
        let mut graph = NodeGraph::new();
        let start = graph.insert(Point::new(0.0, 0.0));
        let a = graph.insert(Point::new(1000.0, 1000.0));
        let b = graph.insert(Point::new(0.0, 1000.0));
        let c = graph.insert(Point::new(1000.0, 0.0));
        graph.connect(start, b, Direction::Up);
        graph.connect(start, a, Direction::Right);
        graph.connect(b, c, Direction::Right);
        (graph, start, vec![start, a])
    }

    #[test]
    fn crossing_is_found_and_resolved_with_a_junction() {
        let (mut graph, start, main_line) = crossing_fixture();
        assert!(find_crossing(&graph, 10.0).is_some());

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        resolve_crossings(&mut graph, start, &main_line, 10.0, &mut rng).expect("resolves");

        assert!(find_crossing(&graph, 10.0).is_none());
        // The diagonals met far from any node, so a junction was inserted
        // rather than an edge deleted.
        assert_eq!(graph.len(), 5);
        let junction = graph.find_at(Point::new(500.0, 500.0)).expect("junction at the center");
        assert_eq!(graph.node(junction).degree(), 4);
    }

    #[test]
    fn near_node_conflicts_delete_an_edge_instead_of_inserting() {
        let (mut graph, start, main_line) = crossing_fixture();
        let edges_before = graph.edges().len();

        // Radius large enough that the crossing point counts as "near" the
        // start node, forcing the deletion path.
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        resolve_crossings(&mut graph, start, &main_line, 800.0, &mut rng).expect("resolves");

        assert!(graph.edges().len() < edges_before, "an edge must have been deleted");
        assert!(find_crossing(&graph, 800.0).is_none());
    }

    #[test]
    fn main_line_edges_win_the_deletion_priority() {
        let (graph, start, _) = crossing_fixture();
        let edges = graph.edges();
        let first = edges[1];
        let second = edges[2];
        let crossing = Crossing { first, second, point: Point::new(500.0, 500.0) };

        let main_members: HashSet<NodeId> = [first.0, first.1].into_iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let doomed = edge_to_delete(&crossing, &main_members, start, &mut rng);
        assert_eq!(doomed, second, "the edge fully on the main line is kept");
    }

    #[test]
    fn clean_graphs_resolve_without_changes() {
        let mut graph = NodeGraph::new();
        let a = graph.insert(Point::new(0.0, 0.0));
        let b = graph.insert(Point::new(300.0, 20.0));
        let c = graph.insert(Point::new(600.0, -10.0));
        graph.connect(a, b, Direction::Right);
        graph.connect(b, c, Direction::Right);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        resolve_crossings(&mut graph, a, &[a, b, c], 60.0, &mut rng).expect("nothing to repair");
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edges().len(), 2);
    }
}
