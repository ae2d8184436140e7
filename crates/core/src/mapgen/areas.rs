//! Area endpoints: the two mandatory map entrances plus optional scattered
//! areas hooked onto nearby border nodes.

use rand_chacha::ChaCha8Rng;

use crate::geom::Point;
use crate::graph::{Direction, ImagePosition, NodeGraph, NodeId};

use super::GenerateError;
use super::events::{EventFactory, EventRequest};
use super::lines::LineSet;
use super::restriction::{AreaSpec, MapRestriction};
use super::rng::{chance, pick, range_f32};

const AREA_ATTEMPTS: usize = 40;

/// Marks the main line's first and last surviving nodes as the start/end
/// areas, then scatters the configured extra areas. Returns the start and
/// end node ids.
pub(super) fn place_areas(
    graph: &mut NodeGraph,
    line_set: &LineSet,
    rng: &mut ChaCha8Rng,
    restriction: &MapRestriction,
    factory: &mut dyn EventFactory,
) -> Result<(NodeId, NodeId), GenerateError> {
    let surviving: Vec<NodeId> = line_set.lines[0]
        .nodes
        .iter()
        .copied()
        .filter(|&id| graph.contains(id))
        .collect();
    if surviving.len() < 2 {
        return Err(GenerateError::NoUsableNodes);
    }
    let start = surviving[0];
    let end = surviving[surviving.len() - 1];

    mark_entrance(graph, start, ImagePosition::Left, &restriction.start_area, restriction, factory);
    mark_entrance(graph, end, ImagePosition::Right, &restriction.end_area, restriction, factory);

    let end_x = graph.node(end).position.x;
    for spec in &restriction.extra_areas {
        place_extra_area(graph, rng, restriction, spec, end_x, factory)?;
    }
    Ok((start, end))
}

fn mark_entrance(
    graph: &mut NodeGraph,
    id: NodeId,
    image_position: ImagePosition,
    area_name: &str,
    restriction: &MapRestriction,
    factory: &mut dyn EventFactory,
) {
    let event = factory.create(EventRequest::EnterArea { area_name });
    let node = graph.node_mut(id);
    node.is_area = true;
    node.image = restriction.area_image.clone().map(|handle| (handle, image_position));
    node.event = Some(event);
}

/// Samples candidate positions along x until one clears the inter-area
/// separation and has at least one eligible border node to hook onto.
fn place_extra_area(
    graph: &mut NodeGraph,
    rng: &mut ChaCha8Rng,
    restriction: &MapRestriction,
    spec: &AreaSpec,
    end_x: f32,
    factory: &mut dyn EventFactory,
) -> Result<(), GenerateError> {
    let max_x = end_x.max(restriction.min_area_distance + restriction.avg_length);
    for _ in 0..AREA_ATTEMPTS {
        let x = range_f32(rng, restriction.min_area_distance, max_x);
        let side_up = chance(rng, 0.5);
        let Some(boundary) = boundary_y(graph, x, side_up, restriction) else {
            continue;
        };
        let y = if side_up {
            boundary + restriction.area_line_distance
        } else {
            boundary - restriction.area_line_distance
        };
        let candidate = Point::new(x, y);

        let too_close = graph.ids().any(|id| {
            let node = graph.node(id);
            node.is_area
                && node.position.distance_to(candidate) < restriction.min_area_distance
        });
        if too_close {
            continue;
        }

        let border: Vec<NodeId> = graph
            .ids()
            .filter(|&id| is_eligible_border(graph, id, candidate, restriction))
            .collect();
        if border.is_empty() {
            continue;
        }
        let gateway = *pick(rng, &border);

        let event = factory.create(EventRequest::EnterArea { area_name: &spec.name });
        let image_position = if side_up { ImagePosition::Above } else { ImagePosition::Below };
        let area = graph.insert(candidate);
        let node = graph.node_mut(area);
        node.is_area = true;
        node.image = spec.image.clone().map(|handle| (handle, image_position));
        node.event = Some(event);
        graph.connect_toward(gateway, area);
        return Ok(());
    }
    Err(GenerateError::NoEligibleCandidate("area position"))
}

/// Path boundary near `x`: the extreme y among nodes inside the scan
/// window, on the requested side.
fn boundary_y(
    graph: &NodeGraph,
    x: f32,
    side_up: bool,
    restriction: &MapRestriction,
) -> Option<f32> {
    graph
        .ids()
        .map(|id| graph.node(id).position)
        .filter(|position| (position.x - x).abs() <= restriction.area_scan_range)
        .map(|position| position.y)
        .reduce(|best, y| if side_up { best.max(y) } else { best.min(y) })
}

/// A border node may host an area connection when it is close enough, has
/// room for another edge, a free slot facing the area, and is not itself
/// an area or an existing area entry.
fn is_eligible_border(
    graph: &NodeGraph,
    id: NodeId,
    candidate: Point,
    restriction: &MapRestriction,
) -> bool {
    let node = graph.node(id);
    !node.is_area
        && node.degree() < 4
        && node.position.distance_to(candidate) <= restriction.area_connect_radius
        && node.slot_is_free(Direction::between(node.position, candidate))
        && !node.neighbors.iter().any(|&neighbor| graph.node(neighbor).is_area)
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::super::SequentialEventFactory;
    use super::super::connect::connect_paths;
    use super::super::lines::build_lines;
    use super::*;

    fn built_map(
        restriction: &MapRestriction,
        seed: u64,
    ) -> (NodeGraph, LineSet, ChaCha8Rng) {
        let mut graph = NodeGraph::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let line_set = build_lines(&mut graph, &mut rng, restriction).expect("lines build");
        connect_paths(&mut graph, &line_set, &mut rng, restriction);
        (graph, line_set, rng)
    }

    #[test]
    fn endpoints_become_areas_with_enter_events() {
        let restriction = MapRestriction {
            area_image: Some("gate".to_string()),
            ..MapRestriction::default()
        };
        let (mut graph, line_set, mut rng) = built_map(&restriction, 21);
        let mut factory = SequentialEventFactory::new();

        let (start, end) =
            place_areas(&mut graph, &line_set, &mut rng, &restriction, &mut factory)
                .expect("areas place");

        assert_ne!(start, end);
        for (id, position) in [(start, ImagePosition::Left), (end, ImagePosition::Right)] {
            let node = graph.node(id);
            assert!(node.is_area);
            assert!(node.event.is_some());
            assert_eq!(node.image.as_ref().map(|(_, p)| *p), Some(position));
        }
    }

    #[test]
    fn extra_areas_respect_minimum_separation() {
        let restriction = MapRestriction {
            min_nodes: 14,
            max_nodes: 16,
            extra_areas: vec![
                AreaSpec { name: "village".to_string(), image: None },
                AreaSpec { name: "cave".to_string(), image: None },
            ],
            min_area_distance: 400.0,
            ..MapRestriction::default()
        };
        let (mut graph, line_set, mut rng) = built_map(&restriction, 8);
        let mut factory = SequentialEventFactory::new();

        place_areas(&mut graph, &line_set, &mut rng, &restriction, &mut factory)
            .expect("areas place");

        let areas: Vec<Point> = graph
            .ids()
            .filter(|&id| graph.node(id).is_area)
            .map(|id| graph.node(id).position)
            .collect();
        assert_eq!(areas.len(), 4, "two endpoints plus two extras");
        for (i, &a) in areas.iter().enumerate() {
            for &b in &areas[i + 1..] {
                assert!(
                    a.distance_to(b) >= restriction.min_area_distance,
                    "areas {a:?} and {b:?} are too close"
                );
            }
        }
    }

    #[test]
    fn extra_area_nodes_hang_off_exactly_one_border_node() {
        let restriction = MapRestriction {
            min_nodes: 14,
            max_nodes: 16,
            extra_areas: vec![AreaSpec { name: "ruin".to_string(), image: None }],
            ..MapRestriction::default()
        };
        let (mut graph, line_set, mut rng) = built_map(&restriction, 4);
        let mut factory = SequentialEventFactory::new();

        place_areas(&mut graph, &line_set, &mut rng, &restriction, &mut factory)
            .expect("areas place");

        let extra = graph
            .ids()
            .find(|&id| {
                graph.node(id).is_area
                    && graph.node(id).image.as_ref().is_none_or(|(_, p)| {
                        *p == ImagePosition::Above || *p == ImagePosition::Below
                    })
                    && graph.node(id).degree() == 1
            })
            .expect("the extra area exists as a one-edge node");
        let gateway = graph.node(extra).neighbors[0];
        assert!(!graph.node(gateway).is_area, "areas never chain directly into areas");
    }
}
