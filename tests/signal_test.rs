//! Signal state machine and geofence preemption tests

use ambulance_routing::dispatch::{
    check_geofence, distance_meters, grid_network, DispatchError, GeoPoint, NodeId, SignalBank,
    SignalId, SignalSeed, SignalState, TrafficSignal, GREEN_TICKS, INITIAL_TIMER_RANGE,
    KOCHI_CENTER, PREEMPTION_TICKS, RED_TICKS, YELLOW_TICKS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn signal_at(id: u32, lat: f64, lon: f64, timer: i32) -> TrafficSignal {
    TrafficSignal::new(
        SignalId(id),
        NodeId(id as u64),
        Some(GeoPoint::new(lat, lon)),
        timer,
    )
}

/// Tick until the next transition, returning how many ticks it took
fn ticks_until_transition(signal: &mut TrafficSignal) -> u32 {
    let mut ticks = 0;
    loop {
        ticks += 1;
        if signal.tick().is_some() {
            return ticks;
        }
        assert!(ticks < 1000, "signal never transitioned");
    }
}

#[test]
fn test_red_turns_green_one_tick_after_timer_expires() {
    let mut signal = signal_at(1, 9.98, 76.29, 30);

    for _ in 0..30 {
        assert_eq!(signal.tick(), None);
        assert_eq!(signal.state(), SignalState::Red);
    }
    assert_eq!(signal.timer(), 0);

    assert_eq!(signal.tick(), Some(SignalState::Green));
    assert_eq!(signal.timer(), GREEN_TICKS);
}

#[test]
fn test_full_signal_cycle() {
    let mut signal = signal_at(1, 9.98, 76.29, RED_TICKS);

    assert_eq!(ticks_until_transition(&mut signal), RED_TICKS as u32 + 1);
    assert_eq!(signal.state(), SignalState::Green);

    assert_eq!(ticks_until_transition(&mut signal), GREEN_TICKS as u32 + 1);
    assert_eq!(signal.state(), SignalState::Yellow);
    assert_eq!(signal.timer(), YELLOW_TICKS);

    assert_eq!(ticks_until_transition(&mut signal), YELLOW_TICKS as u32 + 1);
    assert_eq!(signal.state(), SignalState::Red);
    assert_eq!(signal.timer(), RED_TICKS);
}

#[test]
fn test_preemption_expires_to_red() {
    let mut signal = signal_at(1, 9.98, 76.29, 0);
    signal.tick();
    assert_eq!(signal.state(), SignalState::Green);

    assert!(signal.trigger_preemption());
    assert_eq!(signal.state(), SignalState::PreemptedGreen);
    assert_eq!(signal.timer(), PREEMPTION_TICKS);

    // Already preempted: no change
    for _ in 0..5 {
        signal.tick();
    }
    assert!(!signal.trigger_preemption());
    assert_eq!(signal.timer(), PREEMPTION_TICKS - 5);

    assert_eq!(ticks_until_transition(&mut signal), 21);
    assert_eq!(signal.state(), SignalState::Red);
    assert_eq!(signal.timer(), RED_TICKS);
}

#[test]
fn test_preemption_lasts_twenty_six_ticks() {
    let mut signal = signal_at(1, 9.98, 76.29, 12);
    assert!(signal.trigger_preemption());

    assert_eq!(ticks_until_transition(&mut signal), PREEMPTION_TICKS as u32 + 1);
    assert_eq!(signal.state(), SignalState::Red);
}

#[test]
fn test_display_names() {
    assert_eq!(SignalState::Red.to_string(), "RED");
    assert_eq!(SignalState::PreemptedGreen.to_string(), "PREEMPTED_GREEN");
}

#[test]
fn test_seed_from_graph_places_signals_on_distinct_nodes() {
    let mut rng = StdRng::seed_from_u64(11);
    let graph = grid_network(KOCHI_CENTER, 5, 0.004, &mut rng).unwrap();

    let bank = SignalBank::seed_from_graph(&graph, 20, &mut rng);
    assert_eq!(bank.len(), 20);

    let mut nodes: Vec<NodeId> = bank.iter().map(|s| s.node).collect();
    nodes.sort();
    nodes.dedup();
    assert_eq!(nodes.len(), 20);

    for (i, signal) in bank.iter().enumerate() {
        assert_eq!(signal.id, SignalId(i as u32 + 1));
        assert_eq!(signal.state(), SignalState::Red);
        assert!(INITIAL_TIMER_RANGE.contains(&signal.timer()));
        assert_eq!(signal.position, graph.position(signal.node));
    }

    // Never more signals than nodes
    let bank = SignalBank::seed_from_graph(&graph, 500, &mut rng);
    assert_eq!(bank.len(), graph.node_count());
}

#[test]
fn test_manual_override() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut bank = SignalBank::from_seeds(
        vec![
            SignalSeed {
                id: SignalId(7),
                node: NodeId(70),
                lat: Some(9.98),
                lon: Some(76.29),
            },
            SignalSeed {
                id: SignalId(8),
                node: NodeId(80),
                lat: None,
                lon: None,
            },
        ],
        &mut rng,
    );

    assert!(bank.trigger(SignalId(7)).unwrap());
    assert!(!bank.trigger(SignalId(7)).unwrap());
    // Manual override works without coordinates too
    assert!(bank.trigger(SignalId(8)).unwrap());
    assert_eq!(bank.preempted_count(), 2);

    let result = bank.trigger(SignalId(99));
    assert!(matches!(result, Err(DispatchError::SignalNotFound(SignalId(99)))));
}

#[test]
fn test_distance_meters() {
    assert_eq!(distance_meters(9.98, 76.29, 9.98, 76.29), 0.0);

    // One degree of longitude on the equator
    let d = distance_meters(0.0, 0.0, 0.0, 1.0);
    assert!((d - 111_194.93).abs() < 1.0, "got {d}");
}

#[test]
fn test_geofence_triggers_inside_radius() {
    let mut signals = vec![signal_at(1, 9.9800, 76.2900, 20)];
    let vehicle = GeoPoint::new(9.9810, 76.2900);

    assert!(check_geofence(vehicle, &mut signals, 300.0));
    assert_eq!(signals[0].state(), SignalState::PreemptedGreen);

    // Second pass finds nothing new
    assert!(!check_geofence(vehicle, &mut signals, 300.0));
}

#[test]
fn test_geofence_radius_is_exclusive() {
    let vehicle = GeoPoint::new(9.9800, 76.2900);
    let mut signals = vec![signal_at(1, 9.9820, 76.2910, 20)];
    let radius = distance_meters(vehicle.lat, vehicle.lon, 9.9820, 76.2910);

    assert!(!check_geofence(vehicle, &mut signals, radius));
    assert_eq!(signals[0].state(), SignalState::Red);

    assert!(check_geofence(vehicle, &mut signals, radius + 0.01));
    assert_eq!(signals[0].state(), SignalState::PreemptedGreen);
}

#[test]
fn test_geofence_checks_every_signal() {
    let vehicle = GeoPoint::new(9.9800, 76.2900);
    let mut signals = vec![
        signal_at(1, 9.9801, 76.2900, 20),
        signal_at(2, 9.9900, 76.2900, 20),
        signal_at(3, 9.9800, 76.2901, 20),
        TrafficSignal::new(SignalId(4), NodeId(4), None, 20),
    ];

    assert!(check_geofence(vehicle, &mut signals, 300.0));

    let states: Vec<SignalState> = signals.iter().map(|s| s.state()).collect();
    assert_eq!(
        states,
        vec![
            SignalState::PreemptedGreen,
            SignalState::Red,
            SignalState::PreemptedGreen,
            SignalState::Red,
        ]
    );
}

#[test]
fn test_geofence_skips_signals_without_coordinates() {
    let vehicle = GeoPoint::new(9.9800, 76.2900);
    let mut signals = vec![TrafficSignal::new(SignalId(1), NodeId(1), None, 20)];

    assert!(!check_geofence(vehicle, &mut signals, 1_000_000.0));
    assert_eq!(signals[0].state(), SignalState::Red);
}
