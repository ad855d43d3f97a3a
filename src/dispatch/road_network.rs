//! Road graph store
//!
//! A directed multigraph over petgraph holding static node coordinates and
//! per-edge speed/travel-time attributes that traffic mutates in place.

use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

use super::error::{DispatchError, DispatchResult};
use super::types::{
    travel_time_secs, GeoPoint, NodeId, DEFAULT_SPEED_KPH, MIN_SPEED_KPH,
};

/// Input record for a road node
#[derive(Debug, Clone, Copy)]
pub struct NodeRecord {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl NodeRecord {
    pub fn new(id: u64, lat: f64, lon: f64) -> Self {
        Self {
            id: NodeId(id),
            lat,
            lon,
        }
    }
}

/// Input record for a directed road segment
#[derive(Debug, Clone, Copy)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub length_m: f64,
    /// Posted speed limit, if the source knows one
    pub speed_limit_kph: Option<f64>,
}

impl EdgeRecord {
    pub fn new(from: u64, to: u64, length_m: f64, speed_limit_kph: Option<f64>) -> Self {
        Self {
            from: NodeId(from),
            to: NodeId(to),
            length_m,
            speed_limit_kph,
        }
    }
}

/// A node in the road graph
#[derive(Debug, Clone, Copy)]
pub struct RoadNode {
    pub id: NodeId,
    pub position: GeoPoint,
}

/// Edge data for the road graph
#[derive(Debug, Clone)]
pub struct RoadEdge {
    /// Distinguishes parallel edges between the same ordered node pair
    pub key: u32,
    pub length_m: f64,
    pub base_speed_kph: f64,
    current_speed_kph: f64,
    current_travel_time_s: f64,
}

impl RoadEdge {
    pub fn new(key: u32, length_m: f64, base_speed_kph: f64) -> Self {
        let mut edge = Self {
            key,
            length_m,
            base_speed_kph,
            current_speed_kph: base_speed_kph,
            current_travel_time_s: 0.0,
        };
        edge.set_current_speed(base_speed_kph);
        edge
    }

    pub fn current_speed_kph(&self) -> f64 {
        self.current_speed_kph
    }

    pub fn current_travel_time_s(&self) -> f64 {
        self.current_travel_time_s
    }

    /// Overwrite the current speed (floored at [`MIN_SPEED_KPH`]) and the
    /// travel time derived from it.
    pub fn set_current_speed(&mut self, speed_kph: f64) {
        let speed = speed_kph.max(MIN_SPEED_KPH);
        self.current_speed_kph = speed;
        self.current_travel_time_s = travel_time_secs(self.length_m, speed);
    }
}

/// Strongly connected road graph used for routing
pub struct RoadGraph {
    /// The underlying petgraph directed multigraph
    graph: DiGraph<RoadNode, RoadEdge>,

    /// Maps node IDs to their indices in the graph
    node_index: HashMap<NodeId, NodeIndex>,
}

impl RoadGraph {
    /// Builds the graph and keeps only its largest strongly connected
    /// component, so every retained node can reach every other one.
    pub fn build(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> DispatchResult<Self> {
        if nodes.is_empty() {
            return Err(DispatchError::EmptyGraph);
        }

        let mut full: DiGraph<RoadNode, RoadEdge> =
            DiGraph::with_capacity(nodes.len(), edges.len());
        let mut index: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(nodes.len());

        for record in &nodes {
            if index.contains_key(&record.id) {
                warn!("Duplicate node {} ignored", record.id);
                continue;
            }
            let idx = full.add_node(RoadNode {
                id: record.id,
                position: GeoPoint::new(record.lat, record.lon),
            });
            index.insert(record.id, idx);
        }

        let mut next_key: HashMap<(NodeId, NodeId), u32> = HashMap::new();
        for record in &edges {
            if !record.length_m.is_finite() || record.length_m < 0.0 {
                warn!(
                    "Edge {} -> {} with invalid length {} ignored",
                    record.from, record.to, record.length_m
                );
                continue;
            }
            let from = *index
                .get(&record.from)
                .ok_or(DispatchError::NodeNotFound(record.from))?;
            let to = *index
                .get(&record.to)
                .ok_or(DispatchError::NodeNotFound(record.to))?;

            let key = next_key.entry((record.from, record.to)).or_insert(0);
            let base_speed = record
                .speed_limit_kph
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(DEFAULT_SPEED_KPH);
            full.add_edge(from, to, RoadEdge::new(*key, record.length_m, base_speed));
            *key += 1;
        }

        // Largest component wins; equal sizes go to the one holding the lowest id
        let largest: HashSet<NodeIndex> = kosaraju_scc(&full)
            .into_iter()
            .max_by_key(|component| {
                let lowest = component.iter().map(|idx| full[*idx].id).min();
                (component.len(), std::cmp::Reverse(lowest))
            })
            .unwrap_or_default()
            .into_iter()
            .collect();

        let graph = full.filter_map(
            |idx, node| largest.contains(&idx).then_some(*node),
            |_, edge| Some(edge.clone()),
        );

        let node_index = graph
            .node_indices()
            .map(|idx| (graph[idx].id, idx))
            .collect();

        info!(
            "Road graph built: kept {}/{} nodes and {}/{} edges in the largest strongly connected component",
            graph.node_count(),
            full.node_count(),
            graph.edge_count(),
            full.edge_count()
        );

        Ok(Self { graph, node_index })
    }

    /// Get number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of edges (parallel edges counted separately)
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn position(&self, id: NodeId) -> Option<GeoPoint> {
        self.node(id).map(|node| node.position)
    }

    /// All nodes, in graph order
    pub fn nodes(&self) -> impl Iterator<Item = &RoadNode> {
        self.graph.node_weights()
    }

    /// All node IDs sorted ascending
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.node_index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All edges as (source, target, edge)
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &RoadEdge)> {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].id,
                self.graph[edge.target()].id,
                edge.weight(),
            )
        })
    }

    /// Parallel edges from `from` to `to`, sorted by key
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> Vec<&RoadEdge> {
        let (Some(a), Some(b)) = (self.node_index.get(&from), self.node_index.get(&to)) else {
            return Vec::new();
        };
        let mut edges: Vec<&RoadEdge> = self
            .graph
            .edges_connecting(*a, *b)
            .map(|edge| edge.weight())
            .collect();
        edges.sort_by_key(|edge| edge.key);
        edges
    }

    /// The parallel edge with the lowest current travel time (lowest key on ties)
    pub fn best_edge(&self, from: NodeId, to: NodeId) -> Option<&RoadEdge> {
        self.edges_between(from, to)
            .into_iter()
            .min_by_key(|edge| (OrderedFloat(edge.current_travel_time_s()), edge.key))
    }

    /// Fastest current speed over all edges
    pub fn max_current_speed(&self) -> Option<f64> {
        self.graph
            .edge_weights()
            .map(|edge| edge.current_speed_kph())
            .max_by_key(|speed| OrderedFloat(*speed))
    }

    /// Find the closest node to a coordinate, lowest ID on ties
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<NodeId> {
        let target = GeoPoint::new(lat, lon);
        self.nodes()
            .min_by_key(|node| (OrderedFloat(node.position.distance_m(&target)), node.id))
            .map(|node| node.id)
    }

    /// Overwrite the current speed of one edge and recompute its travel time
    pub fn update_edge_weight(
        &mut self,
        from: NodeId,
        to: NodeId,
        key: u32,
        speed_kph: f64,
    ) -> DispatchResult<()> {
        let not_found = DispatchError::EdgeNotFound {
            from,
            to,
            key: Some(key),
        };
        let (Some(a), Some(b)) = (self.node_index.get(&from), self.node_index.get(&to)) else {
            return Err(not_found);
        };
        let edge_idx: EdgeIndex = self
            .graph
            .edges_connecting(*a, *b)
            .find(|edge| edge.weight().key == key)
            .map(|edge| edge.id())
            .ok_or(not_found)?;

        if let Some(edge) = self.graph.edge_weight_mut(edge_idx) {
            edge.set_current_speed(speed_kph);
            debug!(
                "Edge {} -> {} [{}] now {:.1} km/h",
                from,
                to,
                key,
                edge.current_speed_kph()
            );
        }
        Ok(())
    }

    pub(crate) fn edge_weights_mut(&mut self) -> impl Iterator<Item = &mut RoadEdge> {
        self.graph.edge_weights_mut()
    }

    pub(crate) fn inner(&self) -> &DiGraph<RoadNode, RoadEdge> {
        &self.graph
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_index.get(&id).copied()
    }
}
