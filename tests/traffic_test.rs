//! Traffic randomization and speed reporting tests

use ambulance_routing::dispatch::{
    grid_network, randomize_traffic, route_traffic, traffic_summary, travel_time_secs,
    DispatchError, EdgeRecord, NodeId, NodeRecord, RoadGraph, KOCHI_CENTER, MIN_SPEED_KPH,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_grid(seed: u64) -> (RoadGraph, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let graph = grid_network(KOCHI_CENTER, 6, 0.004, &mut rng).unwrap();
    (graph, rng)
}

fn assert_edge_invariants(graph: &RoadGraph, variation: f64) {
    for (from, to, edge) in graph.edges() {
        let speed = edge.current_speed_kph();
        assert!(speed >= MIN_SPEED_KPH, "edge {from}->{to} below floor: {speed}");

        let low = (edge.base_speed_kph * (1.0 - variation)).max(MIN_SPEED_KPH);
        let high = (edge.base_speed_kph * (1.0 + variation)).max(MIN_SPEED_KPH);
        assert!(
            speed >= low - 1e-9 && speed <= high + 1e-9,
            "edge {from}->{to} speed {speed} outside [{low}, {high}]"
        );

        let expected = travel_time_secs(edge.length_m, speed);
        assert!(
            (edge.current_travel_time_s() - expected).abs() <= 1e-9 * expected.max(1.0),
            "edge {from}->{to} travel time out of sync"
        );
    }
}

#[test]
fn test_randomize_keeps_speeds_within_variation() {
    let (mut graph, mut rng) = seeded_grid(1);
    let updated = randomize_traffic(&mut graph, 0.3, &mut rng).unwrap();

    assert_eq!(updated, graph.edge_count());
    assert_edge_invariants(&graph, 0.3);
}

#[test]
fn test_repeated_randomization_does_not_compound() {
    let (mut graph, mut rng) = seeded_grid(2);
    for _ in 0..50 {
        randomize_traffic(&mut graph, 0.3, &mut rng).unwrap();
        assert_edge_invariants(&graph, 0.3);
    }
}

#[test]
fn test_zero_variation_restores_base_speeds() {
    let (mut graph, mut rng) = seeded_grid(3);
    randomize_traffic(&mut graph, 0.5, &mut rng).unwrap();
    randomize_traffic(&mut graph, 0.0, &mut rng).unwrap();

    for (_, _, edge) in graph.edges() {
        assert_eq!(edge.current_speed_kph(), edge.base_speed_kph);
        assert_eq!(
            edge.current_travel_time_s(),
            travel_time_secs(edge.length_m, edge.base_speed_kph)
        );
    }
}

#[test]
fn test_large_variation_is_floored() {
    let (mut graph, mut rng) = seeded_grid(4);
    for _ in 0..10 {
        randomize_traffic(&mut graph, 1.5, &mut rng).unwrap();
        assert_edge_invariants(&graph, 1.5);
    }
}

#[test]
fn test_invalid_variation_rejected() {
    let (mut graph, mut rng) = seeded_grid(5);

    let result = randomize_traffic(&mut graph, -0.1, &mut rng);
    assert!(matches!(result, Err(DispatchError::InvalidVariation(_))));

    let result = randomize_traffic(&mut graph, f64::NAN, &mut rng);
    assert!(matches!(result, Err(DispatchError::InvalidVariation(_))));
}

#[test]
fn test_traffic_summary_reports_min_max_average() {
    let nodes = vec![NodeRecord::new(1, 0.0, 0.0), NodeRecord::new(2, 0.0, 0.001)];
    let edges = vec![
        EdgeRecord::new(1, 2, 100.0, Some(30.0)),
        EdgeRecord::new(2, 1, 100.0, Some(60.0)),
    ];
    let graph = RoadGraph::build(nodes, edges).unwrap();

    let summary = traffic_summary(&graph).unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.min_speed_kph, 30.0);
    assert_eq!(summary.max_speed_kph, 60.0);
    assert_eq!(summary.avg_speed_kph, 45.0);
}

#[test]
fn test_traffic_summary_empty_graph() {
    let graph = RoadGraph::build(vec![NodeRecord::new(1, 0.0, 0.0)], Vec::new()).unwrap();
    assert_eq!(graph.node_count(), 1);
    assert!(traffic_summary(&graph).is_none());
}

#[test]
fn test_route_traffic_uses_fastest_parallel_edge() {
    let nodes = vec![
        NodeRecord::new(1, 0.0, 0.0),
        NodeRecord::new(2, 0.0, 0.001),
        NodeRecord::new(3, 0.0, 0.002),
    ];
    let edges = vec![
        EdgeRecord::new(1, 2, 100.0, Some(20.0)),
        EdgeRecord::new(1, 2, 100.0, Some(60.0)),
        EdgeRecord::new(2, 3, 100.0, Some(50.0)),
        EdgeRecord::new(2, 3, 100.0, Some(50.0)),
        EdgeRecord::new(3, 2, 100.0, None),
        EdgeRecord::new(2, 1, 100.0, None),
    ];
    let graph = RoadGraph::build(nodes, edges).unwrap();

    let segments = route_traffic(&graph, &[NodeId(1), NodeId(2), NodeId(3)]).unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].key, 1);
    assert_eq!(segments[0].speed_kph, 60.0);
    assert!((segments[0].travel_time_s - 6000.0).abs() < 1e-9);
    // Equal travel times go to the lowest key
    assert_eq!(segments[1].key, 0);
    assert_eq!(segments[1].travel_time_s, 7200.0);

    assert!(route_traffic(&graph, &[NodeId(1)]).unwrap().is_empty());
}

#[test]
fn test_route_traffic_missing_segment() {
    let nodes = vec![
        NodeRecord::new(1, 0.0, 0.0),
        NodeRecord::new(2, 0.0, 0.001),
        NodeRecord::new(3, 0.0, 0.002),
    ];
    let edges = vec![
        EdgeRecord::new(1, 2, 100.0, None),
        EdgeRecord::new(2, 3, 100.0, None),
        EdgeRecord::new(3, 1, 100.0, None),
    ];
    let graph = RoadGraph::build(nodes, edges).unwrap();

    let result = route_traffic(&graph, &[NodeId(1), NodeId(3)]);
    assert!(matches!(
        result,
        Err(DispatchError::EdgeNotFound { key: None, .. })
    ));
}
