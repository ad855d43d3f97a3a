//! Tunables for the dispatch service

use super::geofence::DEFAULT_GEOFENCE_RADIUS_M;
use super::types::HEURISTIC_SPEED_KPH;

/// Number of intersections that get a signal when a graph is loaded
pub const DEFAULT_SIGNAL_COUNT: usize = 20;

/// Default traffic variation (+/-30% around base speed)
pub const DEFAULT_TRAFFIC_VARIATION: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Distance at which an approaching vehicle preempts a signal
    pub geofence_radius_m: f64,
    pub signal_count: usize,
    pub traffic_variation: f64,
    /// Lower bound on the speed the A* heuristic assumes
    pub heuristic_speed_kph: f64,
    /// Seed for reproducible traffic and signal placement
    pub seed: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            geofence_radius_m: DEFAULT_GEOFENCE_RADIUS_M,
            signal_count: DEFAULT_SIGNAL_COUNT,
            traffic_variation: DEFAULT_TRAFFIC_VARIATION,
            heuristic_speed_kph: HEURISTIC_SPEED_KPH,
            seed: None,
        }
    }
}

impl DispatchConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}
