pub mod geom;
pub mod graph;
pub mod mapgen;

pub use geom::{Point, Rect, Segment};
pub use graph::{Direction, EventHandle, GraphNode, ImagePosition, NodeGraph, NodeId};
pub use mapgen::{
    AreaSpec, CumulativeWeights, DecorationKind, DecorationSet, DecorationSpec, DetailMap,
    EventFactory, EventRequest, EventSpec, GenerateError, MapNode, MapRestriction,
    SequentialEventFactory, WeightedEvent, generate, generate_with_factory,
};
