//! Mutable road-graph arena used during generation.
//!
//! Nodes live in a slotmap and reference each other by key, never by
//! pointer, so cycles and deletions are safe. A parallel insertion-order
//! list gives deterministic iteration and the dense indices the finalized
//! map is numbered with. Edge symmetry and the 4-neighbor bound are
//! enforced in `connect`/`disconnect` and nowhere else.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::geom::Point;

new_key_type! {
    pub struct NodeId;
}

/// Opaque handle to a gameplay event produced by an [`EventFactory`].
/// The generator never looks inside it.
///
/// [`EventFactory`]: crate::mapgen::EventFactory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventHandle(pub u32);

/// Where a node's image is drawn relative to the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImagePosition {
    Left,
    Right,
    Above,
    Below,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Dominant-axis direction from one position toward another.
    pub fn between(from: Point, to: Point) -> Direction {
        let delta = to.sub(from);
        if delta.x.abs() >= delta.y.abs() {
            if delta.x >= 0.0 { Direction::Right } else { Direction::Left }
        } else if delta.y >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub position: Point,
    /// Undirected edges, at most 4, always mirrored on the other node.
    pub neighbors: Vec<NodeId>,
    /// Cardinal slot occupancy; a set entry is an index into `neighbors`.
    pub slots: [Option<usize>; 4],
    pub is_area: bool,
    pub image: Option<(String, ImagePosition)>,
    pub event: Option<EventHandle>,
}

impl GraphNode {
    fn new(position: Point) -> Self {
        Self { position, neighbors: Vec::new(), slots: [None; 4], is_area: false, image: None, event: None }
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub fn slot(&self, direction: Direction) -> Option<NodeId> {
        self.slots[direction.index()].map(|index| self.neighbors[index])
    }

    pub fn slot_is_free(&self, direction: Direction) -> bool {
        self.slots[direction.index()].is_none()
    }

    fn free_slot(&self, preferred: Direction) -> Option<Direction> {
        if self.slot_is_free(preferred) {
            return Some(preferred);
        }
        Direction::ALL.into_iter().find(|&direction| self.slot_is_free(direction))
    }
}

#[derive(Clone, Debug, Default)]
pub struct NodeGraph {
    nodes: SlotMap<NodeId, GraphNode>,
    order: Vec<NodeId>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut GraphNode {
        &mut self.nodes[id]
    }

    /// Live node ids in insertion order. All deterministic passes iterate
    /// through this, never through the slotmap directly.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Node at a bit-identical position, if any. Position is the dedup key.
    pub fn find_at(&self, position: Point) -> Option<NodeId> {
        self.ids().find(|&id| self.nodes[id].position.bits_eq(position))
    }

    /// Inserts a node, or returns the existing node at a bit-identical
    /// position.
    pub fn insert(&mut self, position: Point) -> NodeId {
        if let Some(existing) = self.find_at(position) {
            return existing;
        }
        let id = self.nodes.insert(GraphNode::new(position));
        self.order.push(id);
        id
    }

    pub fn connected(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes[a].neighbors.contains(&b)
    }

    /// Adds the undirected edge a–b, claiming `direction` on `a` and its
    /// opposite on `b` (falling back to any free slot on a side whose
    /// preferred slot is taken). Returns false if the edge already exists
    /// or either node is at the 4-neighbor bound.
    pub fn connect(&mut self, a: NodeId, b: NodeId, direction: Direction) -> bool {
        if a == b || self.connected(a, b) {
            return false;
        }
        if self.nodes[a].degree() >= 4 || self.nodes[b].degree() >= 4 {
            return false;
        }
        let Some(slot_a) = self.nodes[a].free_slot(direction) else {
            return false;
        };
        let Some(slot_b) = self.nodes[b].free_slot(direction.opposite()) else {
            return false;
        };

        let node_a = &mut self.nodes[a];
        node_a.neighbors.push(b);
        node_a.slots[slot_a.index()] = Some(node_a.neighbors.len() - 1);

        let node_b = &mut self.nodes[b];
        node_b.neighbors.push(a);
        node_b.slots[slot_b.index()] = Some(node_b.neighbors.len() - 1);
        true
    }

    /// `connect` with the direction derived from the nodes' relative
    /// positions; used when splicing junction nodes into crossing edges.
    pub fn connect_toward(&mut self, a: NodeId, b: NodeId) -> bool {
        let direction = Direction::between(self.nodes[a].position, self.nodes[b].position);
        self.connect(a, b, direction)
    }

    /// Removes the undirected edge a–b, repairing slot indices on both
    /// sides.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) {
        self.remove_neighbor(a, b);
        self.remove_neighbor(b, a);
    }

    fn remove_neighbor(&mut self, owner: NodeId, gone: NodeId) {
        let node = &mut self.nodes[owner];
        let Some(removed) = node.neighbors.iter().position(|&n| n == gone) else {
            return;
        };
        node.neighbors.remove(removed);
        for slot in &mut node.slots {
            *slot = match *slot {
                Some(index) if index == removed => None,
                Some(index) if index > removed => Some(index - 1),
                other => other,
            };
        }
    }

    /// Deduplicated edge list in insertion order of the earlier endpoint.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut edges = Vec::new();
        for a in self.ids() {
            for &b in &self.nodes[a].neighbors {
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    edges.push((a, b));
                }
            }
        }
        edges
    }

    /// Drops every node not reachable from `start`, returning how many were
    /// removed. Reachability over undirected edges means survivors never
    /// hold references into the removed set.
    pub fn prune_unreachable(&mut self, start: NodeId) -> usize {
        let mut reachable: HashSet<NodeId> = HashSet::new();
        let mut open = vec![start];
        reachable.insert(start);
        while let Some(id) = open.pop() {
            for &neighbor in &self.nodes[id].neighbors {
                if reachable.insert(neighbor) {
                    open.push(neighbor);
                }
            }
        }

        let before = self.order.len();
        self.order.retain(|id| reachable.contains(id));
        self.nodes.retain(|id, _| reachable.contains(&id));
        before - self.order.len()
    }

    /// Rotates every node position about the origin.
    pub fn rotate(&mut self, radians: f32) {
        for &id in &self.order {
            let node = &mut self.nodes[id];
            node.position = node.position.rotated(radians);
        }
    }

    /// Scales every node position away from the origin.
    pub fn scale(&mut self, factor: f32) {
        for &id in &self.order {
            let node = &mut self.nodes[id];
            node.position = node.position.scale(factor);
        }
    }
}
