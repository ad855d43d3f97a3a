use ambulance_routing::dispatch::{
    grid_network, log_run_summary, CaseType, DispatchConfig, DispatchService, RunStats,
    VehicleTrack, DEFAULT_GEOFENCE_RADIUS_M, DEFAULT_SIGNAL_COUNT, DEFAULT_TRAFFIC_VARIATION,
    GRID_SPACING_DEG, HEURISTIC_SPEED_KPH, KOCHI_CENTER,
};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::convert::Infallible;

fn parse_case(s: &str) -> Result<CaseType, Infallible> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "ambulance_routing")]
#[command(about = "Headless ambulance routing and signal preemption simulation")]
struct Cli {
    /// Kind of emergency (trauma, cardiac, stroke, neuro, burns, pediatric, general)
    #[arg(long, default_value = "trauma", value_parser = parse_case)]
    case_type: CaseType,

    /// Latitude the ambulance starts from
    #[arg(long, default_value = "9.9620")]
    start_lat: f64,

    /// Longitude the ambulance starts from
    #[arg(long, default_value = "76.2800")]
    start_lon: f64,

    /// Ambulance speed used to move along the route
    #[arg(long, default_value = "60.0")]
    speed_kmh: f64,

    /// Maximum number of one-second ticks to simulate
    #[arg(long, default_value = "600")]
    ticks: u32,

    /// Re-randomize traffic every this many ticks
    #[arg(long, default_value = "30")]
    traffic_every: u32,

    /// Intersections per side of the synthetic street grid
    #[arg(long, default_value = "12")]
    grid_size: usize,

    #[arg(long, default_value_t = DEFAULT_TRAFFIC_VARIATION)]
    variation: f64,

    #[arg(long, default_value_t = DEFAULT_GEOFENCE_RADIUS_M)]
    radius: f64,

    #[arg(long, default_value_t = DEFAULT_SIGNAL_COUNT)]
    signals: usize,

    #[arg(long, default_value_t = HEURISTIC_SPEED_KPH)]
    heuristic_speed: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn config(&self) -> DispatchConfig {
        DispatchConfig {
            geofence_radius_m: self.radius,
            signal_count: self.signals,
            traffic_variation: self.variation,
            heuristic_speed_kph: self.heuristic_speed,
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run one dispatch: build the network, plan a route and drive it
fn run_headless(cli: &Cli) -> Result<()> {
    let config = cli.config();
    let mut grid_rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let service = DispatchService::with_default_hospitals(config);

    info!("Building {}x{} street grid around Kochi...", cli.grid_size, cli.grid_size);
    let graph = grid_network(KOCHI_CENTER, cli.grid_size, GRID_SPACING_DEG, &mut grid_rng)
        .context("Failed to build road network")?;
    service.load_graph(graph).context("Failed to load road network")?;

    service
        .randomize_traffic(service.config().traffic_variation)
        .context("Failed to randomize traffic")?;

    let plan = service
        .plan_route(cli.start_lat, cli.start_lon, cli.case_type)
        .context("Route planning failed")?;
    info!(
        "Dispatching to {} ({} nodes, ~{:.2} min)",
        plan.hospital.name,
        plan.route.path.len(),
        plan.estimated_minutes()
    );

    let mut track = VehicleTrack::new(plan.coordinates.clone(), cli.speed_kmh);
    let mut stats = RunStats {
        distance_m: track.length_m(),
        ..RunStats::default()
    };

    for tick in 1..=cli.ticks {
        track.advance(1.0);
        let Some(position) = track.position() else {
            break;
        };

        let step = service
            .tick_simulation(position.lat, position.lon)
            .context("Simulation tick failed")?;
        stats.record_tick(step.preemption_triggered, &step.signals);
        debug!("Tick {}: vehicle at {}", tick, position);

        if cli.traffic_every > 0 && tick % cli.traffic_every == 0 {
            service
                .randomize_traffic(service.config().traffic_variation)
                .context("Failed to randomize traffic")?;
            stats.traffic_updates += 1;
        }

        if track.is_finished() {
            info!("Arrived at {} after {} ticks", plan.hospital.name, tick);
            break;
        }
    }

    let traffic = service
        .traffic_summary()
        .context("Failed to read traffic summary")?;
    log_run_summary(&plan, &stats, traffic);
    Ok(())
}
