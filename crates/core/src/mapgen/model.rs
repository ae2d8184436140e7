//! Public data model for a finalized generated map.

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::geom::Point;
use crate::graph::{EventHandle, ImagePosition, NodeGraph, NodeId};

fn push_str(bytes: &mut Vec<u8>, value: &str) {
    bytes.extend((value.len() as u32).to_le_bytes());
    bytes.extend(value.as_bytes());
}

/// One node of the finalized graph. Neighbor references are indices into
/// `DetailMap::nodes`, densely packed from 0 in generation order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub position: Point,
    pub neighbors: Vec<usize>,
    pub is_area: bool,
    pub image: Option<(String, ImagePosition)>,
    pub event: Option<EventHandle>,
}

/// All placed instances of one decoration type, sharing a texture handle
/// and base size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationSet {
    pub image: String,
    pub base_width: f32,
    pub base_height: f32,
    /// Per-instance world position and scale, back-to-front (descending y).
    pub instances: Vec<(Point, f32)>,
}

/// The immutable product of a `generate` call. Ownership passes entirely
/// to the caller; rendering and persistence layers consume it read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailMap {
    pub name: String,
    /// Index of the designated start node (main line's first node).
    pub start: usize,
    /// Index of the designated end node (main line's last node).
    pub end: usize,
    pub nodes: Vec<MapNode>,
    pub decorations: Vec<DecorationSet>,
}

impl DetailMap {
    /// Stable byte encoding of everything the map contains, for
    /// fingerprinting and determinism checks. Float fields are encoded as
    /// their raw bits so bit-identical maps hash identically and nothing
    /// else does.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        push_str(&mut bytes, &self.name);
        bytes.extend((self.start as u32).to_le_bytes());
        bytes.extend((self.end as u32).to_le_bytes());

        bytes.extend((self.nodes.len() as u32).to_le_bytes());
        for node in &self.nodes {
            bytes.extend(node.position.x.to_le_bytes());
            bytes.extend(node.position.y.to_le_bytes());
            bytes.extend((node.neighbors.len() as u32).to_le_bytes());
            for &neighbor in &node.neighbors {
                bytes.extend((neighbor as u32).to_le_bytes());
            }
            bytes.push(u8::from(node.is_area));
            match &node.image {
                None => bytes.push(0),
                Some((handle, position)) => {
                    bytes.push(1);
                    push_str(&mut bytes, handle);
                    bytes.push(match position {
                        ImagePosition::Left => 0,
                        ImagePosition::Right => 1,
                        ImagePosition::Above => 2,
                        ImagePosition::Below => 3,
                    });
                }
            }
            match node.event {
                None => bytes.push(0),
                Some(EventHandle(id)) => {
                    bytes.push(1);
                    bytes.extend(id.to_le_bytes());
                }
            }
        }

        bytes.extend((self.decorations.len() as u32).to_le_bytes());
        for set in &self.decorations {
            push_str(&mut bytes, &set.image);
            bytes.extend(set.base_width.to_le_bytes());
            bytes.extend(set.base_height.to_le_bytes());
            bytes.extend((set.instances.len() as u32).to_le_bytes());
            for (position, scale) in &set.instances {
                bytes.extend(position.x.to_le_bytes());
                bytes.extend(position.y.to_le_bytes());
                bytes.extend(scale.to_le_bytes());
            }
        }

        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.neighbors.len()).sum::<usize>() / 2
    }
}

/// Freezes the working graph into a `DetailMap`, assigning dense indices
/// in the graph's deterministic insertion order.
pub(super) fn finalize(
    graph: &NodeGraph,
    start: NodeId,
    end: NodeId,
    decorations: Vec<DecorationSet>,
    name: &str,
) -> DetailMap {
    let mut index_of: SecondaryMap<NodeId, usize> = SecondaryMap::new();
    for (index, id) in graph.ids().enumerate() {
        index_of.insert(id, index);
    }

    let nodes = graph
        .ids()
        .map(|id| {
            let node = graph.node(id);
            MapNode {
                position: node.position,
                neighbors: node.neighbors.iter().map(|&n| index_of[n]).collect(),
                is_area: node.is_area,
                image: node.image.clone(),
                event: node.event,
            }
        })
        .collect();

    DetailMap { name: name.to_string(), start: index_of[start], end: index_of[end], nodes, decorations }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> DetailMap {
        DetailMap {
            name: "sample".to_string(),
            start: 0,
            end: 1,
            nodes: vec![
                MapNode {
                    position: Point::new(0.0, 0.0),
                    neighbors: vec![1],
                    is_area: true,
                    image: Some(("gate".to_string(), ImagePosition::Left)),
                    event: Some(EventHandle(0)),
                },
                MapNode {
                    position: Point::new(250.0, 10.0),
                    neighbors: vec![0],
                    is_area: true,
                    image: None,
                    event: Some(EventHandle(1)),
                },
            ],
            decorations: vec![DecorationSet {
                image: "tree".to_string(),
                base_width: 40.0,
                base_height: 60.0,
                instances: vec![(Point::new(30.0, 90.0), 1.1)],
            }],
        }
    }

    #[test]
    fn canonical_bytes_are_stable_for_equal_maps() {
        assert_eq!(sample_map().canonical_bytes(), sample_map().canonical_bytes());
        assert_eq!(sample_map().fingerprint(), sample_map().fingerprint());
    }

    #[test]
    fn canonical_bytes_see_every_field() {
        let base = sample_map();

        let mut moved = sample_map();
        moved.nodes[1].position.y = 10.5;
        assert_ne!(base.canonical_bytes(), moved.canonical_bytes());

        let mut renamed = sample_map();
        renamed.decorations[0].image = "rock".to_string();
        assert_ne!(base.canonical_bytes(), renamed.canonical_bytes());

        let mut rescaled = sample_map();
        rescaled.decorations[0].instances[0].1 = 1.2;
        assert_ne!(base.canonical_bytes(), rescaled.canonical_bytes());
    }

    #[test]
    fn edge_count_halves_symmetric_references() {
        assert_eq!(sample_map().edge_count(), 1);
    }
}
