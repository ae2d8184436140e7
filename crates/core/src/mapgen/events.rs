//! Event assignment: fixed scripted events on preferred nodes, then
//! weighted optional events filling every remaining node.

use rand_chacha::ChaCha8Rng;

use crate::graph::{EventHandle, NodeGraph, NodeId};

use super::GenerateError;
use super::restriction::{EventSpec, MapRestriction};
use super::rng::{range_usize, unit_f32};

/// What an event handle is being requested for. Borrowed so factories can
/// key off names without any allocation on the hot path.
pub enum EventRequest<'a> {
    /// Travel to another map, identified by area name.
    EnterArea { area_name: &'a str },
    /// A scripted event from the restriction's fixed or optional pool.
    Scripted { spec: &'a EventSpec },
}

/// Mints opaque event handles for the generator. Callers that embed maps
/// into a larger game supply their own factory to tie handles to content.
pub trait EventFactory {
    fn create(&mut self, request: EventRequest<'_>) -> EventHandle;
}

/// Default factory: hands out handles counting up from zero.
#[derive(Debug, Default)]
pub struct SequentialEventFactory {
    next_id: u32,
}

impl SequentialEventFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventFactory for SequentialEventFactory {
    fn create(&mut self, _request: EventRequest<'_>) -> EventHandle {
        let handle = EventHandle(self.next_id);
        self.next_id += 1;
        handle
    }
}

/// Normalized cumulative distribution over a weight list.
pub struct CumulativeWeights {
    cumulative: Vec<f32>,
}

impl CumulativeWeights {
    pub fn new(weights: &[f32]) -> Result<Self, GenerateError> {
        let total: f32 = weights.iter().sum();
        if !(total > 0.0) {
            return Err(GenerateError::ZeroOptionalEventWeight);
        }
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut running = 0.0;
        for &weight in weights {
            running += weight / total;
            cumulative.push(running);
        }
        // Pin the top so rounding can never leave a draw unmatched.
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        Ok(Self { cumulative })
    }

    pub fn sample(&self, rng: &mut ChaCha8Rng) -> usize {
        let draw = unit_f32(rng);
        self.cumulative
            .iter()
            .position(|&bound| draw < bound)
            .unwrap_or(self.cumulative.len() - 1)
    }
}

/// Places every fixed event on its own node, preferring dead ends where
/// requested, then fills all remaining non-area nodes from the optional
/// pool by weight.
pub(super) fn assign_events(
    graph: &mut NodeGraph,
    rng: &mut ChaCha8Rng,
    restriction: &MapRestriction,
    factory: &mut dyn EventFactory,
) -> Result<(), GenerateError> {
    let mut dead_ends: Vec<NodeId> = Vec::new();
    let mut others: Vec<NodeId> = Vec::new();
    for id in graph.ids() {
        let node = graph.node(id);
        if node.is_area || node.event.is_some() {
            continue;
        }
        if node.degree() == 1 {
            dead_ends.push(id);
        } else {
            others.push(id);
        }
    }

    for spec in &restriction.fixed_events {
        let id = if spec.prefers_dead_end && !dead_ends.is_empty() {
            let index = range_usize(rng, 0, dead_ends.len() - 1);
            dead_ends.remove(index)
        } else {
            let total = others.len() + dead_ends.len();
            if total == 0 {
                break;
            }
            let index = range_usize(rng, 0, total - 1);
            if index < others.len() {
                others.remove(index)
            } else {
                dead_ends.remove(index - others.len())
            }
        };
        let event = factory.create(EventRequest::Scripted { spec });
        graph.node_mut(id).event = Some(event);
    }

    if restriction.optional_events.is_empty() {
        return Ok(());
    }
    let weights: Vec<f32> =
        restriction.optional_events.iter().map(|weighted| weighted.weight).collect();
    let table = CumulativeWeights::new(&weights)?;

    let remaining: Vec<NodeId> = graph
        .ids()
        .filter(|&id| {
            let node = graph.node(id);
            !node.is_area && node.event.is_none()
        })
        .collect();
    for id in remaining {
        let spec = &restriction.optional_events[table.sample(rng)].spec;
        let event = factory.create(EventRequest::Scripted { spec });
        graph.node_mut(id).event = Some(event);
    }
    Ok(())
}
