//! Seeded procedural road-map generation split into coherent submodules.
//!
//! One `ChaCha8Rng` seeded from the caller's 64-bit seed is threaded by
//! mutable reference through every stage in a fixed order, so a given
//! `(seed, restriction)` pair always produces a bit-identical map.

pub mod model;
pub mod restriction;

mod areas;
mod connect;
mod crossings;
mod decorations;
mod events;
mod lines;
mod rng;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use crate::graph::NodeGraph;

pub use events::{CumulativeWeights, EventFactory, EventRequest, SequentialEventFactory};
pub use model::{DecorationSet, DetailMap, MapNode};
pub use restriction::{
    AreaSpec, DecorationKind, DecorationSpec, EventSpec, MapRestriction, WeightedEvent,
};

/// A failed `generate` call. Generation is all-or-nothing; no partial map
/// is ever returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerateError {
    /// Node-count or line-count bounds cannot produce a usable map.
    NoUsableNodes,
    /// A length or width parameter is zero/negative and would feed NaNs
    /// into angle math.
    DegenerateGeometry(&'static str),
    /// Optional events were requested but their weights sum to zero.
    ZeroOptionalEventWeight,
    /// A placement step ran out of candidates (which collection is named).
    NoEligibleCandidate(&'static str),
    /// The crossing-repair loop failed to reach a fixed point within its
    /// pass budget.
    RepairLimitExceeded { passes: usize },
}

/// Generates a map with the default event factory.
pub fn generate(seed: u64, restriction: &MapRestriction) -> Result<DetailMap, GenerateError> {
    let mut factory = SequentialEventFactory::new();
    generate_with_factory(seed, restriction, &mut factory)
}

/// Generates a map, producing events through the caller's factory.
pub fn generate_with_factory(
    seed: u64,
    restriction: &MapRestriction,
    factory: &mut dyn EventFactory,
) -> Result<DetailMap, GenerateError> {
    validate(restriction)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut graph = NodeGraph::new();

    let line_set = lines::build_lines(&mut graph, &mut rng, restriction)?;
    connect::connect_paths(&mut graph, &line_set, &mut rng, restriction);
    crossings::resolve_crossings(
        &mut graph,
        line_set.lines[0].nodes[0],
        &line_set.lines[0].nodes,
        restriction.path_width,
        &mut rng,
    )?;
    let (start, end) = areas::place_areas(&mut graph, &line_set, &mut rng, restriction, factory)?;
    events::assign_events(&mut graph, &mut rng, restriction, factory)?;
    if restriction.rotation != 0.0 {
        graph.rotate(restriction.rotation);
    }
    let decoration_sets = decorations::scatter_decorations(&graph, &mut rng, restriction);

    Ok(model::finalize(&graph, start, end, decoration_sets, &restriction.name))
}

fn validate(restriction: &MapRestriction) -> Result<(), GenerateError> {
    if restriction.min_nodes < 2
        || restriction.min_nodes > restriction.max_nodes
        || restriction.max_lines == 0
    {
        return Err(GenerateError::NoUsableNodes);
    }
    if !(restriction.avg_length > 0.0) {
        return Err(GenerateError::DegenerateGeometry("avg_length"));
    }
    if !(restriction.path_width > 0.0) {
        return Err(GenerateError::DegenerateGeometry("path_width"));
    }
    if !(restriction.max_width > 0.0) {
        return Err(GenerateError::DegenerateGeometry("max_width"));
    }
    Ok(())
}
