//! Synthetic traffic for the road graph
//!
//! Speeds are redrawn around each edge's base speed on every call, so repeated
//! randomization never drifts away from the posted limits.

use log::debug;
use rand::Rng;

use super::error::{DispatchError, DispatchResult};
use super::road_network::RoadGraph;
use super::types::NodeId;

/// Aggregate current-speed statistics over every edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficSummary {
    pub min_speed_kph: f64,
    pub max_speed_kph: f64,
    pub avg_speed_kph: f64,
    pub count: usize,
}

/// Current conditions on one segment of a route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTraffic {
    pub from: NodeId,
    pub to: NodeId,
    /// Key of the parallel edge the segment uses
    pub key: u32,
    pub speed_kph: f64,
    pub travel_time_s: f64,
}

/// Redraw every edge's current speed as `base * U[1 - variation, 1 + variation]`.
///
/// Returns the number of edges updated.
pub fn randomize_traffic<R: Rng>(
    graph: &mut RoadGraph,
    variation: f64,
    rng: &mut R,
) -> DispatchResult<usize> {
    if !variation.is_finite() || variation < 0.0 {
        return Err(DispatchError::InvalidVariation(variation));
    }

    let mut updated = 0;
    for edge in graph.edge_weights_mut() {
        let factor = rng.random_range((1.0 - variation)..=(1.0 + variation));
        edge.set_current_speed(edge.base_speed_kph * factor);
        updated += 1;
    }

    debug!(
        "Randomized traffic on {} edges (variation {:.0}%)",
        updated,
        variation * 100.0
    );
    Ok(updated)
}

/// Min/max/mean current speed, or `None` for a graph without edges
pub fn traffic_summary(graph: &RoadGraph) -> Option<TrafficSummary> {
    let mut count = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut total = 0.0;

    for (_, _, edge) in graph.edges() {
        let speed = edge.current_speed_kph();
        min = min.min(speed);
        max = max.max(speed);
        total += speed;
        count += 1;
    }

    (count > 0).then(|| TrafficSummary {
        min_speed_kph: min,
        max_speed_kph: max,
        avg_speed_kph: total / count as f64,
        count,
    })
}

/// Per-segment conditions along a node path
pub fn route_traffic(graph: &RoadGraph, path: &[NodeId]) -> DispatchResult<Vec<SegmentTraffic>> {
    path.windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            let edge = graph
                .best_edge(from, to)
                .ok_or(DispatchError::EdgeNotFound { from, to, key: None })?;
            Ok(SegmentTraffic {
                from,
                to,
                key: edge.key,
                speed_kph: edge.current_speed_kph(),
                travel_time_s: edge.current_travel_time_s(),
            })
        })
        .collect()
}
