use std::process::{Command, Output};

fn run_simulation(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ambulance_routing"))
        .args(args)
        .env("RUST_LOG", "warn,ambulance_routing=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Parse the number logged after `label`
fn logged_value(stderr: &str, label: &str) -> f64 {
    let line = stderr
        .lines()
        .find(|line| line.contains(label))
        .unwrap_or_else(|| panic!("Could not find '{}' line", label));

    // Format: "[2026-01-01T00:00:00Z INFO  ambulance_routing::dispatch::stats] Route nodes: 14"
    let parts: Vec<&str> = line.split(label).collect();
    parts
        .get(1)
        .and_then(|s| s.trim().trim_end_matches('m').parse().ok())
        .unwrap_or_else(|| panic!("Could not parse value from line: {}", line))
}

/// Test that a seeded headless dispatch runs to completion
#[test]
fn test_headless_dispatch_runs() {
    let output = run_simulation(&["--seed", "7"]);

    assert!(
        output.status.success(),
        "Simulation failed to run. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("=== SIMULATION COMPLETE ==="),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that the run summary is logged
#[test]
fn test_run_summary_logged() {
    let output = run_simulation(&["--seed", "7", "--case-type", "cardiac"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for label in [
        "Hospital:",
        "Route nodes:",
        "Search strategy:",
        "Estimated minutes:",
        "Ticks simulated:",
        "Preemption ticks:",
        "Traffic speeds:",
    ] {
        assert!(stderr.contains(label), "Missing '{}' statistic", label);
    }

    let route_nodes = logged_value(&stderr, "Route nodes:");
    assert!(route_nodes >= 2.0, "Route too short: {}", route_nodes);

    let ticks = logged_value(&stderr, "Ticks simulated:");
    assert!(ticks > 0.0, "No ticks were simulated");
}

/// Test that seeded runs are reproducible
#[test]
fn test_seeded_runs_match() {
    let first = run_simulation(&["--seed", "11", "--ticks", "120"]);
    let second = run_simulation(&["--seed", "11", "--ticks", "120"]);
    assert!(first.status.success() && second.status.success());

    let first = String::from_utf8_lossy(&first.stderr);
    let second = String::from_utf8_lossy(&second.stderr);
    for label in ["Route nodes:", "Estimated minutes:", "Ticks simulated:"] {
        assert_eq!(
            logged_value(&first, label),
            logged_value(&second, label),
            "'{}' differs between seeded runs",
            label
        );
    }
}

/// Test that an invalid traffic variation is reported as a failure
#[test]
fn test_invalid_variation_fails() {
    let output = run_simulation(&["--seed", "7", "--variation=-1"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("traffic variation"),
        "Missing variation error. stderr: {}",
        stderr
    );
}
