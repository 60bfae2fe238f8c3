//! Realm Sim - Entry Point
//!
//! Builds the zone grid, populates it with the demo population and drives
//! ticks at a fixed period until the tick cap or ctrl-c.

use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use realm_sim::core::config::SimulationConfig;
use realm_sim::core::error::{Result, SimError};
use realm_sim::world::{run_tick_loop, WorldManager};

/// Headless world simulation
#[derive(Parser, Debug)]
#[command(name = "realm-sim")]
#[command(about = "Run the zoned world simulation and print tick reports")]
struct Args {
    /// TOML config file; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks (runs until ctrl-c when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Simulated seconds per real second
    #[arg(long)]
    speed: Option<f64>,

    /// Zone worker threads (0 = one per core)
    #[arg(long)]
    workers: Option<usize>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print a JSON tick report every N ticks
    #[arg(long, default_value_t = 10)]
    report_every: u64,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::new(),
    };
    if let Some(speed) = args.speed {
        config.speed_multiplier = speed;
    }
    if let Some(workers) = args.workers {
        config.worker_count = workers;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().map_err(SimError::InvalidConfig)?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realm_sim=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let period = config.tick_period();
    tracing::info!(seed = config.seed, "Realm Sim starting...");

    let mut world = WorldManager::new(config)?;
    world.populate();
    let world = Arc::new(Mutex::new(world));

    let report_every = args.report_every.max(1);
    let rt = tokio::runtime::Runtime::new()?;
    let ticks = rt.block_on(run_tick_loop(
        Arc::clone(&world),
        period,
        args.ticks,
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        },
        |report| {
            if report.tick % report_every == 0 {
                match serde_json::to_string(report) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "Failed to serialize tick report"),
                }
            }
        },
    ))?;

    let world = world.lock().map_err(|_| SimError::Poisoned)?;
    for (zone, threat) in world.threat_levels() {
        tracing::info!(%zone, threat, "Final threat level");
    }
    tracing::info!(ticks, entities = world.entity_count(), "Realm Sim stopped");
    Ok(())
}
