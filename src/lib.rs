//! Emergency Vehicle Routing Library
//!
//! Time-optimal ambulance routing over a road network whose travel times
//! change with simulated traffic, and traffic-signal preemption as the
//! vehicle approaches intersections.

pub mod dispatch;
