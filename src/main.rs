use clap::Parser;
use log::info;

use intersection_sim::simulation::{
    FixedCycle, FrameControl, RoadTopology, SimConfig, SimulationClock, Snapshot,
};

#[derive(Parser)]
#[command(name = "intersection_sim")]
#[command(about = "Headless signalized intersection grid simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "2000")]
    ticks: u64,

    /// Seed for reproducible spawn choices
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks between spawn attempts
    #[arg(long, default_value = "80")]
    spawn_interval: u64,

    /// Keep every light in its initial state
    #[arg(long)]
    fixed_lights: bool,

    /// Ticks a light stays green
    #[arg(long, default_value = "240")]
    green_ticks: u64,

    /// Ticks a light stays yellow
    #[arg(long, default_value = "60")]
    yellow_ticks: u64,

    /// Ticks a light stays red
    #[arg(long, default_value = "300")]
    red_ticks: u64,

    /// Log a summary every this many ticks
    #[arg(long, default_value = "500")]
    report_every: u64,

    /// Wall-clock pause between frames in milliseconds
    #[arg(long, default_value = "0")]
    frame_delay_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> anyhow::Result<()> {
    let config = SimConfig {
        spawn_interval: cli.spawn_interval,
        ..SimConfig::default()
    };
    let mut clock = SimulationClock::new(RoadTopology::standard()?, config)?;
    if let Some(seed) = cli.seed {
        clock = clock.with_seed(seed);
    }
    if !cli.fixed_lights {
        clock = clock.with_controller(Box::new(FixedCycle::new(
            cli.green_ticks,
            cli.yellow_ticks,
            cli.red_ticks,
        )));
    }

    info!("Running intersection simulation in headless mode...");
    info!("Ticks: {}, spawn interval: {}", cli.ticks, cli.spawn_interval);

    let report_every = cli.report_every.max(1);
    let delay = std::time::Duration::from_millis(cli.frame_delay_ms);

    clock.start();
    let ticks_run = clock.run(cli.ticks, |snapshot| {
        if snapshot.tick % report_every == 0 {
            report(snapshot);
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        FrameControl::Continue
    });
    clock.stop();

    let stats = clock.stats();
    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks run: {}", ticks_run);
    info!("Total vehicles spawned: {}", stats.spawned);
    info!("Total vehicles despawned: {}", stats.despawned);
    info!("Spawn attempts rejected: {}", stats.rejected_spawns);
    info!("Active vehicles: {}", clock.vehicles().len());
    info!("Traffic lights: {}", clock.lights().count());
    Ok(())
}

fn report(snapshot: &Snapshot) {
    info!("--- After tick {} ---", snapshot.tick);
    let lights: Vec<String> = snapshot
        .lights
        .iter()
        .map(|light| format!("{}:{:?}", light.id.0, light.state))
        .collect();
    info!("  Lights: {}", lights.join(" "));
    let stopped = snapshot
        .vehicles
        .iter()
        .filter(|vehicle| vehicle.speed.units() == 0)
        .count();
    info!(
        "  Vehicles: {} ({} stopped)",
        snapshot.vehicles.len(),
        stopped
    );
}
