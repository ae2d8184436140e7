use std::collections::{HashSet, VecDeque};

use roadmap_core::{
    DecorationKind, DecorationSpec, EventHandle, EventRequest, EventSpec, ImagePosition,
    MapRestriction, WeightedEvent, generate, generate_with_factory,
};

fn reachable_count(map: &roadmap_core::DetailMap) -> usize {
    let mut seen = HashSet::from([map.start]);
    let mut frontier = VecDeque::from([map.start]);
    while let Some(current) = frontier.pop_front() {
        for &neighbor in &map.nodes[current].neighbors {
            if seen.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }
    seen.len()
}

#[test]
fn test_minimal_single_line_map_is_a_walkable_chain() {
    let restriction = MapRestriction {
        name: "minimal".to_string(),
        min_nodes: 5,
        max_nodes: 5,
        max_lines: 1,
        split_probability: 0.0,
        ..MapRestriction::default()
    };

    for seed in 0..20 {
        let map = generate(seed, &restriction).expect("minimal map generates");
        assert!(
            map.nodes.len() >= 5,
            "five drawn nodes survive; repair may only add junctions (seed {seed})"
        );
        assert_eq!(reachable_count(&map), map.nodes.len(), "seed {seed} left nodes stranded");

        let start = &map.nodes[map.start];
        let end = &map.nodes[map.end];
        assert!(start.is_area && end.is_area);
        assert!(start.event.is_some() && end.event.is_some());
        assert!(
            end.position.x > start.position.x,
            "the end area sits further along the map than the start"
        );
    }
}

#[test]
fn test_area_images_face_the_map() {
    let restriction = MapRestriction {
        area_image: Some("gate".to_string()),
        ..MapRestriction::default()
    };
    let map = generate(11, &restriction).expect("map generates");

    let side = |index: usize| map.nodes[index].image.as_ref().map(|(_, position)| *position);
    assert_eq!(side(map.start), Some(ImagePosition::Left));
    assert_eq!(side(map.end), Some(ImagePosition::Right));
}

#[test]
fn test_rotation_spins_node_positions_without_reshaping_the_graph() {
    let quarter_turn = std::f32::consts::FRAC_PI_2;
    let flat = MapRestriction::default();
    let rotated = MapRestriction { rotation: quarter_turn, ..MapRestriction::default() };

    let plain = generate(42, &flat).expect("map generates");
    let spun = generate(42, &rotated).expect("map generates");

    assert_eq!(plain.nodes.len(), spun.nodes.len());
    for (before, after) in plain.nodes.iter().zip(&spun.nodes) {
        assert_eq!(before.neighbors, after.neighbors, "rotation must not rewire the graph");
        let expected = before.position.rotated(quarter_turn);
        assert!(
            expected.distance_to(after.position) < 1e-3,
            "node at {:?} should land on {expected:?}, got {:?}",
            before.position,
            after.position
        );
    }
}

#[test]
fn test_custom_event_factory_sees_every_request() {
    #[derive(Default)]
    struct RecordingFactory {
        next_id: u32,
        areas: Vec<String>,
        scripted: Vec<String>,
    }

    impl roadmap_core::EventFactory for RecordingFactory {
        fn create(&mut self, request: EventRequest<'_>) -> EventHandle {
            match request {
                EventRequest::EnterArea { area_name } => self.areas.push(area_name.to_string()),
                EventRequest::Scripted { spec } => self.scripted.push(spec.name.clone()),
            }
            let handle = EventHandle(self.next_id);
            self.next_id += 1;
            handle
        }
    }

    let restriction = MapRestriction {
        start_area: "camp".to_string(),
        end_area: "summit".to_string(),
        fixed_events: vec![EventSpec { name: "boss".to_string(), prefers_dead_end: false }],
        optional_events: vec![WeightedEvent {
            spec: EventSpec { name: "fight".to_string(), prefers_dead_end: false },
            weight: 1.0,
        }],
        ..MapRestriction::default()
    };

    let mut factory = RecordingFactory::default();
    let map = generate_with_factory(5, &restriction, &mut factory).expect("map generates");

    assert_eq!(factory.areas, vec!["camp".to_string(), "summit".to_string()]);
    assert!(factory.scripted.contains(&"boss".to_string()));
    let events = map.nodes.iter().filter(|node| node.event.is_some()).count();
    assert_eq!(events, factory.areas.len() + factory.scripted.len());
}

#[test]
fn test_decorated_map_orders_instances_back_to_front() {
    let restriction = MapRestriction {
        decorations: vec![
            DecorationSpec {
                image: "tree".to_string(),
                base_width: 40.0,
                base_height: 60.0,
                scale_min: 0.9,
                scale_max: 1.1,
                ignore_paths: false,
                kind: DecorationKind::Uniform { density: 0.3 },
            },
            DecorationSpec {
                image: "pebble".to_string(),
                base_width: 10.0,
                base_height: 10.0,
                scale_min: 0.5,
                scale_max: 1.0,
                ignore_paths: true,
                kind: DecorationKind::MultiCluster {
                    block_size: 250.0,
                    cluster_probability: 0.3,
                    density: 0.2,
                },
            },
        ],
        ..MapRestriction::default()
    };

    let map = generate(8, &restriction).expect("map generates");
    assert_eq!(map.decorations.len(), 2);
    for set in &map.decorations {
        let ys: Vec<f32> = set.instances.iter().map(|(position, _)| position.y).collect();
        assert!(
            ys.windows(2).all(|pair| pair[0] >= pair[1]),
            "set {:?} is not sorted back-to-front",
            set.image
        );
    }
}
