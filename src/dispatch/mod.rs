//! Emergency dispatch core
//!
//! Route planning over a road graph with simulated traffic, plus traffic
//! signal preemption driven by vehicle proximity. Everything here runs
//! without any I/O; callers share one [`DispatchService`] across requests.

mod config;
mod error;
mod geofence;
mod hospital;
mod planner;
mod road_network;
mod scenario;
mod service;
mod signal;
mod stats;
mod traffic;
mod types;

pub use config::{DispatchConfig, DEFAULT_SIGNAL_COUNT, DEFAULT_TRAFFIC_VARIATION};
pub use error::{DispatchError, DispatchResult, PlanError};
pub use geofence::{check_geofence, distance_meters, DEFAULT_GEOFENCE_RADIUS_M};
pub use hospital::{Capability, CaseType, Hospital, HospitalDirectory};
pub use planner::{
    astar, dijkstra, heuristic_speed_kph, plan, straight_line_estimate, RouteResult,
    SearchStrategy,
};
pub use road_network::{EdgeRecord, NodeRecord, RoadEdge, RoadGraph, RoadNode};
pub use scenario::{grid_network, VehicleTrack, GRID_SPACING_DEG, KOCHI_CENTER};
pub use service::{DispatchService, GraphStatus, RoutePlan, SimulationStep};
pub use signal::{
    SignalBank, SignalSeed, SignalSnapshot, SignalState, TrafficSignal, GREEN_TICKS,
    INITIAL_TIMER_RANGE, PREEMPTION_TICKS, RED_TICKS, SIGNAL_CYCLE, YELLOW_TICKS,
};
pub use stats::{log_run_summary, RunStats};
pub use traffic::{
    randomize_traffic, route_traffic, traffic_summary, SegmentTraffic, TrafficSummary,
};
pub use types::{
    travel_time_secs, GeoPoint, HospitalId, NodeId, SignalId, DEFAULT_SPEED_KPH,
    EARTH_RADIUS_M, HEURISTIC_SPEED_KPH, MIN_SPEED_KPH,
};
