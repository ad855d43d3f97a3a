//! Traffic signal state machine
//!
//! Each signal cycles RED -> GREEN -> YELLOW -> RED on fixed dwell times and
//! can be interrupted into PREEMPTED_GREEN, which always expires back to RED.

use log::{debug, info};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::fmt;
use std::ops::RangeInclusive;

use super::error::{DispatchError, DispatchResult};
use super::road_network::RoadGraph;
use super::types::{GeoPoint, NodeId, SignalId};

/// Dwell in ticks for each state
pub const RED_TICKS: i32 = 30;
pub const GREEN_TICKS: i32 = 40;
pub const YELLOW_TICKS: i32 = 5;
pub const PREEMPTION_TICKS: i32 = 25;

/// Range a freshly seeded signal draws its first RED timer from
pub const INITIAL_TIMER_RANGE: RangeInclusive<i32> = 10..=30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalState {
    Red,
    Green,
    Yellow,
    /// Forced green while an emergency vehicle passes
    PreemptedGreen,
}

impl SignalState {
    /// Ticks a state holds once entered
    pub fn dwell_ticks(self) -> i32 {
        match self {
            SignalState::Red => RED_TICKS,
            SignalState::Green => GREEN_TICKS,
            SignalState::Yellow => YELLOW_TICKS,
            SignalState::PreemptedGreen => PREEMPTION_TICKS,
        }
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalState::Red => "RED",
            SignalState::Green => "GREEN",
            SignalState::Yellow => "YELLOW",
            SignalState::PreemptedGreen => "PREEMPTED_GREEN",
        };
        f.write_str(name)
    }
}

/// The regular cycle every signal follows
pub const SIGNAL_CYCLE: [SignalState; 3] =
    [SignalState::Red, SignalState::Green, SignalState::Yellow];

/// A signal-bearing intersection
#[derive(Debug, Clone)]
pub struct TrafficSignal {
    pub id: SignalId,
    /// The node the signal sits on
    pub node: NodeId,
    /// `None` when the source had no coordinates; such signals are never geofenced
    pub position: Option<GeoPoint>,
    state: SignalState,
    timer: i32,
    cycle: [SignalState; 3],
}

impl TrafficSignal {
    /// A RED signal counting down from `timer`
    pub fn new(id: SignalId, node: NodeId, position: Option<GeoPoint>, timer: i32) -> Self {
        Self {
            id,
            node,
            position,
            state: SignalState::Red,
            timer,
            cycle: SIGNAL_CYCLE,
        }
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn timer(&self) -> i32 {
        self.timer
    }

    pub fn is_preempted(&self) -> bool {
        self.state == SignalState::PreemptedGreen
    }

    /// Advance one tick. Returns the new state if a transition happened.
    ///
    /// The timer is decremented while positive and the transition fires on
    /// the tick after it reaches zero, so a state entered with timer `T`
    /// lasts `T + 1` ticks.
    pub fn tick(&mut self) -> Option<SignalState> {
        if self.timer > 0 {
            self.timer -= 1;
            return None;
        }

        let next = match self.state {
            SignalState::PreemptedGreen => SignalState::Red,
            current => {
                let pos = self.cycle.iter().position(|s| *s == current).unwrap_or(0);
                self.cycle[(pos + 1) % self.cycle.len()]
            }
        };
        self.state = next;
        self.timer = next.dwell_ticks();
        Some(next)
    }

    /// Force the signal green for the preemption window.
    ///
    /// Returns false if the signal is already preempted.
    pub fn trigger_preemption(&mut self) -> bool {
        if self.is_preempted() {
            return false;
        }
        self.state = SignalState::PreemptedGreen;
        self.timer = PREEMPTION_TICKS;
        true
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            id: self.id,
            position: self.position,
            state: self.state,
        }
    }
}

/// Seed for a signal supplied by an external source
#[derive(Debug, Clone, Copy)]
pub struct SignalSeed {
    pub id: SignalId,
    pub node: NodeId,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Read-only view of a signal reported to callers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSnapshot {
    pub id: SignalId,
    pub position: Option<GeoPoint>,
    pub state: SignalState,
}

/// Every signal in the network
#[derive(Debug, Clone, Default)]
pub struct SignalBank {
    signals: Vec<TrafficSignal>,
}

impl SignalBank {
    /// Place signals on `count` randomly sampled graph nodes
    pub fn seed_from_graph<R: Rng>(graph: &RoadGraph, count: usize, rng: &mut R) -> Self {
        let node_ids = graph.node_ids();
        let chosen: Vec<NodeId> = node_ids
            .choose_multiple(rng, count.min(node_ids.len()))
            .copied()
            .collect();

        let signals = chosen
            .into_iter()
            .enumerate()
            .map(|(i, node)| {
                let timer = rng.random_range(INITIAL_TIMER_RANGE);
                TrafficSignal::new(SignalId(i as u32 + 1), node, graph.position(node), timer)
            })
            .collect::<Vec<_>>();

        info!("Seeded {} traffic signals", signals.len());
        Self { signals }
    }

    /// Build signals from externally designated nodes
    pub fn from_seeds<R: Rng>(seeds: Vec<SignalSeed>, rng: &mut R) -> Self {
        let signals = seeds
            .into_iter()
            .map(|seed| {
                let position = match (seed.lat, seed.lon) {
                    (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
                    _ => None,
                };
                let timer = rng.random_range(INITIAL_TIMER_RANGE);
                TrafficSignal::new(seed.id, seed.node, position, timer)
            })
            .collect();
        Self { signals }
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn get(&self, id: SignalId) -> Option<&TrafficSignal> {
        self.signals.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrafficSignal> {
        self.signals.iter()
    }

    pub fn signals_mut(&mut self) -> &mut [TrafficSignal] {
        &mut self.signals
    }

    /// Tick every signal once, returning how many changed state
    pub fn tick_all(&mut self) -> usize {
        let mut transitions = 0;
        for signal in &mut self.signals {
            if let Some(next) = signal.tick() {
                debug!("Signal {} -> {}", signal.id, next);
                transitions += 1;
            }
        }
        transitions
    }

    /// Preempt a signal by ID, bypassing the geofence
    pub fn trigger(&mut self, id: SignalId) -> DispatchResult<bool> {
        let signal = self
            .signals
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DispatchError::SignalNotFound(id))?;
        let triggered = signal.trigger_preemption();
        if triggered {
            info!("Signal {} preempted by manual override", id);
        }
        Ok(triggered)
    }

    pub fn snapshot(&self) -> Vec<SignalSnapshot> {
        self.signals.iter().map(TrafficSignal::snapshot).collect()
    }

    /// Number of signals currently held green for an emergency vehicle
    pub fn preempted_count(&self) -> usize {
        self.signals.iter().filter(|s| s.is_preempted()).count()
    }
}
