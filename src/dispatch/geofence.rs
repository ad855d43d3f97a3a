//! Proximity-based signal preemption

use log::info;

use super::signal::TrafficSignal;
use super::types::GeoPoint;

/// Default trigger radius around a signal, in metres
pub const DEFAULT_GEOFENCE_RADIUS_M: f64 = 300.0;

/// Great-circle distance in metres between two coordinates
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    GeoPoint::new(lat1, lon1).distance_m(&GeoPoint::new(lat2, lon2))
}

/// Preempt every signal strictly within `radius_m` of the vehicle.
///
/// All signals are evaluated; signals without coordinates are skipped.
/// Returns true if at least one signal entered preemption on this call.
pub fn check_geofence(vehicle: GeoPoint, signals: &mut [TrafficSignal], radius_m: f64) -> bool {
    let mut triggered = false;
    for signal in signals.iter_mut() {
        let Some(position) = signal.position else {
            continue;
        };
        if signal.is_preempted() {
            continue;
        }
        let distance = vehicle.distance_m(&position);
        if distance < radius_m && signal.trigger_preemption() {
            info!(
                "Geofence: signal {} preempted, vehicle {:.0}m away",
                signal.id, distance
            );
            triggered = true;
        }
    }
    triggered
}
