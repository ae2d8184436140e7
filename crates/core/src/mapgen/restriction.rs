//! Declarative generation parameters.
//!
//! A `MapRestriction` is built once (usually deserialized by an outer
//! config layer) and read-only for the duration of a `generate` call.

use serde::{Deserialize, Serialize};

use crate::geom::Rect;

/// A named map entrance/exit to scatter along the path, beyond the two
/// mandatory endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaSpec {
    /// Name of the map this area leads to.
    pub name: String,
    /// Texture handle drawn at the area node, if any.
    pub image: Option<String>,
}

/// Description handed to the [`EventFactory`] for one gameplay event.
/// The generator only reads `prefers_dead_end`; everything else is opaque
/// to it.
///
/// [`EventFactory`]: super::EventFactory
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub name: String,
    /// Fixed events with this flag grab degree-1 nodes while any remain.
    pub prefers_dead_end: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedEvent {
    pub spec: EventSpec,
    pub weight: f32,
}

/// Point-distribution strategy for one decoration type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DecorationKind {
    /// Independent uniform samples across the whole padded map bounds.
    Uniform { density: f32 },
    /// One soft-edged radial cluster, optionally centered inside a
    /// sub-rectangle of the map bounds.
    SingleCluster {
        inner_radius: f32,
        outer_radius: f32,
        density: f32,
        center_box: Option<Rect>,
    },
    /// Jittered grid blocks marked as clusters with spatial contagion;
    /// candidates survive only inside marked blocks.
    MultiCluster {
        block_size: f32,
        cluster_probability: f32,
        density: f32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationSpec {
    /// Texture handle shared by every instance of this decoration.
    pub image: String,
    pub base_width: f32,
    pub base_height: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    /// Skip the road-rectangle collision filter for this decoration.
    pub ignore_paths: bool,
    pub kind: DecorationKind,
}

/// All tunable generation parameters, immutable during a `generate` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRestriction {
    pub name: String,

    /// Main-line node count is drawn uniformly from `min_nodes..=max_nodes`.
    pub min_nodes: usize,
    pub max_nodes: usize,
    /// Total line budget including the main line.
    pub max_lines: usize,
    /// Base probability that a main-line node sprouts extra cross-links.
    pub split_probability: f32,

    /// Average step length between consecutive nodes of a line.
    pub avg_length: f32,
    /// Fraction of the half-circle *removed* from the step-heading spread;
    /// 1.0 forces perfectly straight lines.
    pub max_angle_percent: f32,
    /// Vertical band the main line is biased to stay inside.
    pub max_width: f32,
    /// Minimum vertical gap kept between a branch line and its parent.
    pub min_line_gap: f32,
    /// Half-width of the x-window scanned when clamping a branch line
    /// against its parent's local extremum.
    pub line_scan_range: f32,
    /// Total physical width of a road, used as the crossing-repair safety
    /// margin and the road collision footprint.
    pub path_width: f32,

    /// Name of the map entered at the main line's first node.
    pub start_area: String,
    /// Name of the map entered at the main line's last node.
    pub end_area: String,
    /// Texture drawn at the two mandatory endpoint areas.
    pub area_image: Option<String>,
    pub extra_areas: Vec<AreaSpec>,
    /// Minimum distance between any two area nodes, and the margin the
    /// first optional-area candidate keeps from x = 0.
    pub min_area_distance: f32,
    /// How far outward from the path boundary an optional area sits.
    pub area_line_distance: f32,
    /// Radius around an area within which border nodes may connect to it.
    pub area_connect_radius: f32,
    /// Half-width of the x-window scanned when computing the path boundary
    /// an optional area sits beyond.
    pub area_scan_range: f32,

    pub fixed_events: Vec<EventSpec>,
    pub optional_events: Vec<WeightedEvent>,

    pub decorations: Vec<DecorationSpec>,

    /// Final rotation of the whole map about the origin, radians.
    pub rotation: f32,
}

impl Default for MapRestriction {
    fn default() -> Self {
        Self {
            name: "generated".to_string(),
            min_nodes: 8,
            max_nodes: 12,
            max_lines: 3,
            split_probability: 0.3,
            avg_length: 260.0,
            max_angle_percent: 0.6,
            max_width: 700.0,
            min_line_gap: 220.0,
            line_scan_range: 400.0,
            path_width: 60.0,
            start_area: "start".to_string(),
            end_area: "end".to_string(),
            area_image: None,
            extra_areas: Vec::new(),
            min_area_distance: 500.0,
            area_line_distance: 260.0,
            area_connect_radius: 450.0,
            area_scan_range: 400.0,
            fixed_events: Vec::new(),
            optional_events: Vec::new(),
            decorations: Vec::new(),
            rotation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restriction_round_trips_through_json() {
        let restriction = MapRestriction {
            extra_areas: vec![AreaSpec { name: "village".to_string(), image: None }],
            fixed_events: vec![EventSpec { name: "boss".to_string(), prefers_dead_end: true }],
            optional_events: vec![WeightedEvent {
                spec: EventSpec { name: "fight".to_string(), prefers_dead_end: false },
                weight: 2.0,
            }],
            decorations: vec![DecorationSpec {
                image: "tree".to_string(),
                base_width: 40.0,
                base_height: 60.0,
                scale_min: 0.8,
                scale_max: 1.3,
                ignore_paths: false,
                kind: DecorationKind::Uniform { density: 0.1 },
            }],
            ..MapRestriction::default()
        };

        let json = serde_json::to_string(&restriction).expect("serializes");
        let back: MapRestriction = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, restriction);
    }
}
