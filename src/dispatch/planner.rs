//! Route planning over current travel times
//!
//! A* runs first with a straight-line time estimate; any failure falls back
//! to Dijkstra (A* with a null heuristic) over the same edge weights.

use log::{debug, warn};
use ordered_float::OrderedFloat;
use petgraph::algo::astar as petgraph_astar;

use super::error::{DispatchError, DispatchResult, PlanError};
use super::road_network::RoadGraph;
use super::types::{GeoPoint, NodeId};

/// Slack allowed when comparing the start estimate against the found cost
const ADMISSIBILITY_EPSILON: f64 = 1e-6;

/// Node path and accumulated travel time
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub path: Vec<NodeId>,
    pub travel_time_s: f64,
}

/// Which search produced a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    AStar,
    Dijkstra,
}

/// Speed the heuristic assumes.
///
/// The configured bound is raised to the fastest current edge speed and to
/// the fastest straight-line rate any edge offers (great-circle km between its
/// endpoints per hour of travel time). With the latter no single edge can beat
/// the estimate, so the heuristic stays consistent even on edges shorter than
/// the distance between their endpoints.
pub fn heuristic_speed_kph(graph: &RoadGraph, bound_kph: f64) -> f64 {
    let fastest_speed = graph.max_current_speed().unwrap_or(bound_kph);
    let fastest_rate = graph
        .edges()
        .filter_map(|(from, to, edge)| {
            let distance_km = graph.position(from)?.distance_km(&graph.position(to)?);
            let rate = distance_km / (edge.current_travel_time_s() / 3600.0);
            (!rate.is_nan()).then_some(rate)
        })
        .max_by_key(|rate| OrderedFloat(*rate))
        .unwrap_or(bound_kph);
    bound_kph.max(fastest_speed).max(fastest_rate)
}

/// Straight-line travel time from `from` to `goal` at `speed_kph`
pub fn straight_line_estimate(from: &GeoPoint, goal: &GeoPoint, speed_kph: f64) -> f64 {
    from.distance_km(goal) / speed_kph * 3600.0
}

/// A* search minimizing current travel time
pub fn astar(
    graph: &RoadGraph,
    start: NodeId,
    end: NodeId,
    speed_bound_kph: f64,
) -> Result<RouteResult, PlanError> {
    let goal = graph.position(end).ok_or(PlanError::UnknownNode(end))?;
    let start_pos = graph.position(start).ok_or(PlanError::UnknownNode(start))?;
    let speed = heuristic_speed_kph(graph, speed_bound_kph);

    let route = search(graph, start, end, |pos| {
        straight_line_estimate(pos, &goal, speed)
    })?;

    let estimate = straight_line_estimate(&start_pos, &goal, speed);
    if !estimate.is_finite() || estimate > route.travel_time_s + ADMISSIBILITY_EPSILON {
        return Err(PlanError::InadmissibleHeuristic {
            estimate,
            cost: route.travel_time_s,
        });
    }
    Ok(route)
}

/// Dijkstra search over the same weights as [`astar`]
pub fn dijkstra(graph: &RoadGraph, start: NodeId, end: NodeId) -> Result<RouteResult, PlanError> {
    search(graph, start, end, |_| 0.0)
}

/// Explicit two-step policy: A*, then Dijkstra if A* fails
pub fn plan(
    graph: &RoadGraph,
    start: NodeId,
    end: NodeId,
    speed_bound_kph: f64,
) -> DispatchResult<(RouteResult, SearchStrategy)> {
    match astar(graph, start, end, speed_bound_kph) {
        Ok(route) => Ok((route, SearchStrategy::AStar)),
        Err(err) => {
            warn!("A* failed: {}. Falling back to Dijkstra.", err);
            dijkstra(graph, start, end)
                .map(|route| (route, SearchStrategy::Dijkstra))
                .map_err(|source| DispatchError::RoutingFailed {
                    from: start,
                    to: end,
                    source,
                })
        }
    }
}

fn search<H>(
    graph: &RoadGraph,
    start: NodeId,
    end: NodeId,
    estimate: H,
) -> Result<RouteResult, PlanError>
where
    H: Fn(&GeoPoint) -> f64,
{
    let start_idx = graph.index_of(start).ok_or(PlanError::UnknownNode(start))?;
    let end_idx = graph.index_of(end).ok_or(PlanError::UnknownNode(end))?;

    if start == end {
        return Ok(RouteResult {
            path: vec![start],
            travel_time_s: 0.0,
        });
    }

    let inner = graph.inner();
    let (cost, nodes) = petgraph_astar(
        inner,
        start_idx,
        |node| node == end_idx,
        |edge| OrderedFloat(edge.weight().current_travel_time_s()),
        |node| OrderedFloat(estimate(&inner[node].position)),
    )
    .ok_or(PlanError::NoPath {
        from: start,
        to: end,
    })?;

    if !cost.0.is_finite() {
        return Err(PlanError::NonFiniteCost);
    }

    let path: Vec<NodeId> = nodes.iter().map(|idx| inner[*idx].id).collect();
    debug!(
        "Route {} -> {}: {} nodes, {:.1}s",
        start,
        end,
        path.len(),
        cost.0
    );
    Ok(RouteResult {
        path,
        travel_time_s: cost.0,
    })
}
