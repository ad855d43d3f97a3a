//! Counters and end-of-run summary for headless dispatch runs

use log::info;

use super::service::RoutePlan;
use super::signal::{SignalSnapshot, SignalState};
use super::traffic::TrafficSummary;

/// Counters collected over a headless run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub ticks: u32,
    /// Ticks on which the geofence preempted at least one signal
    pub preemption_ticks: u32,
    pub signals_preempted: usize,
    pub traffic_updates: u32,
    pub distance_m: f64,
}

impl RunStats {
    pub fn record_tick(&mut self, preemption_triggered: bool, signals: &[SignalSnapshot]) {
        self.ticks += 1;
        if preemption_triggered {
            self.preemption_ticks += 1;
        }
        self.signals_preempted = self.signals_preempted.max(
            signals
                .iter()
                .filter(|s| s.state == SignalState::PreemptedGreen)
                .count(),
        );
    }
}

/// Log the end-of-run summary
pub fn log_run_summary(plan: &RoutePlan, stats: &RunStats, traffic: Option<TrafficSummary>) {
    info!("=== SIMULATION COMPLETE ===");
    info!("Hospital: {}", plan.hospital.name);
    info!("Route nodes: {}", plan.route.path.len());
    info!("Search strategy: {:?}", plan.strategy);
    info!("Estimated minutes: {:.2}", plan.estimated_minutes());
    info!("Distance driven: {:.0}m", stats.distance_m);
    info!("Ticks simulated: {}", stats.ticks);
    info!("Preemption ticks: {}", stats.preemption_ticks);
    info!("Peak signals preempted: {}", stats.signals_preempted);
    info!("Traffic updates: {}", stats.traffic_updates);
    if let Some(summary) = traffic {
        info!(
            "Traffic speeds: min {:.1}, avg {:.1}, max {:.1} km/h over {} edges",
            summary.min_speed_kph,
            summary.avg_speed_kph,
            summary.max_speed_kph,
            summary.count
        );
    }
}
