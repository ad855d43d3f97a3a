//! Core types for emergency dispatch
//!
//! Identifiers, geographic coordinates and the constants shared between the
//! graph store, the traffic mutator and the planner.

use std::fmt;

/// Mean Earth radius in metres used by every great-circle computation
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Speed assigned to an edge when the road carries no posted limit
pub const DEFAULT_SPEED_KPH: f64 = 50.0;

/// Lowest speed an edge can be slowed down to
pub const MIN_SPEED_KPH: f64 = 5.0;

/// Upper speed bound assumed by the A* heuristic unless the graph is faster
pub const HEURISTIC_SPEED_KPH: f64 = 80.0;

/// Travel time across `length_m` at `speed_kph`, in the graph's time unit.
///
/// Every edge weight in the crate is derived through this function so the
/// stored travel time always matches the stored speed.
#[inline]
pub fn travel_time_secs(length_m: f64, speed_kph: f64) -> f64 {
    length_m / speed_kph * 3600.0
}

/// Identifier of a road node, as supplied by the map source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a traffic signal (assigned from 1 at load time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub u32);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a hospital in the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HospitalId(pub u32);

/// A WGS-84 coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Haversine great-circle distance in kilometres
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        self.distance_m(other) / 1000.0
    }

    /// Linear interpolation between two points (fine at street scale)
    pub fn lerp(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
