//! Error taxonomy for the dispatch core

use thiserror::Error;

use super::types::{NodeId, SignalId};

/// Errors surfaced by the dispatch service and its components
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No road graph has been loaded into the service yet
    #[error("road graph not loaded")]
    GraphNotLoaded,

    #[error("road graph has no nodes")]
    EmptyGraph,

    #[error("node {0} not found in road graph")]
    NodeNotFound(NodeId),

    #[error("no edge {from} -> {to} (key {key:?})")]
    EdgeNotFound {
        from: NodeId,
        to: NodeId,
        key: Option<u32>,
    },

    /// Neither a capable hospital nor any fallback hospital exists
    #[error("no hospital available for case type '{case}'")]
    NoHospital { case: String },

    /// Both A* and Dijkstra failed
    #[error("routing failed from {from} to {to}: {source}")]
    RoutingFailed {
        from: NodeId,
        to: NodeId,
        source: PlanError,
    },

    #[error("signal {0} not found")]
    SignalNotFound(SignalId),

    #[error("traffic variation must be a finite non-negative fraction, got {0}")]
    InvalidVariation(f64),

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Failure of a single search strategy inside the route planner
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("node {0} is not part of the road graph")]
    UnknownNode(NodeId),

    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("search produced a non-finite travel time")]
    NonFiniteCost,

    #[error("heuristic estimate {estimate:.1}s exceeds route cost {cost:.1}s")]
    InadmissibleHeuristic { estimate: f64, cost: f64 },
}
