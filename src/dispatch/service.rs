//! Shared service context for dispatch requests
//!
//! Owns the road graph, the signal bank and the hospital directory. Every
//! request handler holds an `Arc<DispatchService>`; the graph sits behind a
//! read-write lock so routing and statistics never see an edge mid-update,
//! and all signal mutation goes through one mutex.

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::config::DispatchConfig;
use super::error::{DispatchError, DispatchResult};
use super::geofence::check_geofence;
use super::hospital::{CaseType, Hospital, HospitalDirectory};
use super::planner::{self, RouteResult, SearchStrategy};
use super::road_network::RoadGraph;
use super::signal::{SignalBank, SignalSeed, SignalSnapshot};
use super::traffic::{self, SegmentTraffic, TrafficSummary};
use super::types::{GeoPoint, NodeId, SignalId};

/// Size of the loaded graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStatus {
    pub nodes: usize,
    pub edges: usize,
}

/// A planned ambulance trip to a hospital
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub hospital: Hospital,
    pub route: RouteResult,
    /// Position of every node on the route, in order
    pub coordinates: Vec<GeoPoint>,
    pub strategy: SearchStrategy,
}

impl RoutePlan {
    /// Travel time in minutes, rounded to two decimals
    pub fn estimated_minutes(&self) -> f64 {
        (self.route.travel_time_s / 60.0 * 100.0).round() / 100.0
    }
}

/// Outcome of one simulation tick
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationStep {
    pub preemption_triggered: bool,
    pub signals: Vec<SignalSnapshot>,
}

pub struct DispatchService {
    config: DispatchConfig,
    graph: RwLock<Option<RoadGraph>>,
    signals: Mutex<SignalBank>,
    hospitals: HospitalDirectory,
    rng: Mutex<StdRng>,
}

impl DispatchService {
    pub fn new(config: DispatchConfig, hospitals: HospitalDirectory) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            config,
            graph: RwLock::new(None),
            signals: Mutex::new(SignalBank::default()),
            hospitals,
            rng: Mutex::new(rng),
        }
    }

    /// Service over the Ernakulam hospital directory
    pub fn with_default_hospitals(config: DispatchConfig) -> Self {
        Self::new(config, HospitalDirectory::ernakulam())
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn hospitals(&self) -> &HospitalDirectory {
        &self.hospitals
    }

    fn read_graph(&self) -> DispatchResult<RwLockReadGuard<'_, Option<RoadGraph>>> {
        self.graph
            .read()
            .map_err(|_| DispatchError::LockPoisoned("graph"))
    }

    fn write_graph(&self) -> DispatchResult<RwLockWriteGuard<'_, Option<RoadGraph>>> {
        self.graph
            .write()
            .map_err(|_| DispatchError::LockPoisoned("graph"))
    }

    fn lock_signals(&self) -> DispatchResult<MutexGuard<'_, SignalBank>> {
        self.signals
            .lock()
            .map_err(|_| DispatchError::LockPoisoned("signals"))
    }

    fn lock_rng(&self) -> DispatchResult<MutexGuard<'_, StdRng>> {
        self.rng.lock().map_err(|_| DispatchError::LockPoisoned("rng"))
    }

    /// Install a graph and place signals on randomly sampled nodes
    pub fn load_graph(&self, graph: RoadGraph) -> DispatchResult<()> {
        let bank = {
            let mut rng = self.lock_rng()?;
            SignalBank::seed_from_graph(&graph, self.config.signal_count, &mut *rng)
        };
        self.install(graph, bank)
    }

    /// Install a graph with externally designated signals
    pub fn load_graph_with_signals(
        &self,
        graph: RoadGraph,
        seeds: Vec<SignalSeed>,
    ) -> DispatchResult<()> {
        let bank = {
            let mut rng = self.lock_rng()?;
            SignalBank::from_seeds(seeds, &mut *rng)
        };
        self.install(graph, bank)
    }

    fn install(&self, graph: RoadGraph, bank: SignalBank) -> DispatchResult<()> {
        info!(
            "Loaded graph with {} nodes, {} edges and {} signals",
            graph.node_count(),
            graph.edge_count(),
            bank.len()
        );
        *self.lock_signals()? = bank;
        *self.write_graph()? = Some(graph);
        Ok(())
    }

    /// `None` until a graph is loaded
    pub fn graph_status(&self) -> DispatchResult<Option<GraphStatus>> {
        Ok(self.read_graph()?.as_ref().map(|graph| GraphStatus {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        }))
    }

    /// Run `f` against the loaded graph under the read lock
    pub fn with_graph<T>(&self, f: impl FnOnce(&RoadGraph) -> T) -> DispatchResult<T> {
        let guard = self.read_graph()?;
        let graph = guard.as_ref().ok_or(DispatchError::GraphNotLoaded)?;
        Ok(f(graph))
    }

    /// Hospitals able to take `case`
    pub fn filter_hospitals(&self, case: CaseType) -> Vec<Hospital> {
        self.hospitals.filter(case).into_iter().cloned().collect()
    }

    /// Pick a hospital for `case` and route to it from the given position
    pub fn plan_route(
        &self,
        start_lat: f64,
        start_lon: f64,
        case: CaseType,
    ) -> DispatchResult<RoutePlan> {
        let guard = self.read_graph()?;
        let graph = guard.as_ref().ok_or(DispatchError::GraphNotLoaded)?;

        let start = GeoPoint::new(start_lat, start_lon);
        let hospital = self.hospitals.select(case, start)?.clone();

        let start_node = graph
            .nearest_node(start.lat, start.lon)
            .ok_or(DispatchError::EmptyGraph)?;
        let end_node = graph
            .nearest_node(hospital.position.lat, hospital.position.lon)
            .ok_or(DispatchError::EmptyGraph)?;

        let (route, strategy) =
            planner::plan(graph, start_node, end_node, self.config.heuristic_speed_kph)?;
        let coordinates = route
            .path
            .iter()
            .filter_map(|node| graph.position(*node))
            .collect();

        info!(
            "Route to {}: {} nodes, {:.1}s via {:?}",
            hospital.name,
            route.path.len(),
            route.travel_time_s,
            strategy
        );

        Ok(RoutePlan {
            hospital,
            route,
            coordinates,
            strategy,
        })
    }

    /// Route between two graph nodes with the A*-then-Dijkstra policy
    pub fn route_between(&self, start: NodeId, end: NodeId) -> DispatchResult<RouteResult> {
        let guard = self.read_graph()?;
        let graph = guard.as_ref().ok_or(DispatchError::GraphNotLoaded)?;
        planner::plan(graph, start, end, self.config.heuristic_speed_kph).map(|(route, _)| route)
    }

    /// Tick every signal, then preempt signals near the vehicle
    pub fn tick_simulation(
        &self,
        vehicle_lat: f64,
        vehicle_lon: f64,
    ) -> DispatchResult<SimulationStep> {
        let mut bank = self.lock_signals()?;
        bank.tick_all();
        let preemption_triggered = check_geofence(
            GeoPoint::new(vehicle_lat, vehicle_lon),
            bank.signals_mut(),
            self.config.geofence_radius_m,
        );
        Ok(SimulationStep {
            preemption_triggered,
            signals: bank.snapshot(),
        })
    }

    pub fn signal_status(&self) -> DispatchResult<Vec<SignalSnapshot>> {
        Ok(self.lock_signals()?.snapshot())
    }

    /// Preempt a signal by ID regardless of vehicle position
    pub fn trigger_manual_preemption(&self, signal_id: SignalId) -> DispatchResult<bool> {
        self.lock_signals()?.trigger(signal_id)
    }

    /// Redraw all edge speeds around their base values
    pub fn randomize_traffic(&self, variation: f64) -> DispatchResult<usize> {
        let mut guard = self.write_graph()?;
        let graph = guard.as_mut().ok_or(DispatchError::GraphNotLoaded)?;
        let mut rng = self.lock_rng()?;
        traffic::randomize_traffic(graph, variation, &mut *rng)
    }

    /// `Ok(None)` if the loaded graph has no edges
    pub fn traffic_summary(&self) -> DispatchResult<Option<TrafficSummary>> {
        let guard = self.read_graph()?;
        let graph = guard.as_ref().ok_or(DispatchError::GraphNotLoaded)?;
        Ok(traffic::traffic_summary(graph))
    }

    pub fn route_traffic(&self, path: &[NodeId]) -> DispatchResult<Vec<SegmentTraffic>> {
        let guard = self.read_graph()?;
        let graph = guard.as_ref().ok_or(DispatchError::GraphNotLoaded)?;
        traffic::route_traffic(graph, path)
    }

    pub fn update_edge_weight(
        &self,
        from: NodeId,
        to: NodeId,
        key: u32,
        speed_kph: f64,
    ) -> DispatchResult<()> {
        let mut guard = self.write_graph()?;
        let graph = guard.as_mut().ok_or(DispatchError::GraphNotLoaded)?;
        graph.update_edge_weight(from, to, key, speed_kph)
    }
}
