//! Engine binary for Ration.
//!
//! Wires together configuration, the simulation, and the run loop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ration-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing), `RUST_LOG` first, then
//!    `logging.level`
//! 3. Validate configuration and build the [`Simulation`]
//! 4. Inject the seed organisms
//! 5. Run `world.updates` scheduling rounds
//! 6. Log the result, optionally print occupancy grids, and print the run
//!    summary as JSON on stdout

mod error;
mod seeding;

use std::path::Path;

use ration_core::{Simulation, SimulationConfig, runner};
use ration_population::Replicator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "ration-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the run itself fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("ration-engine starting");
    if from_file {
        info!(path = CONFIG_PATH, "Configuration loaded");
    } else {
        info!("Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        updates = config.world.updates,
        populations = config.populations.len(),
        "World configuration"
    );

    // 3. Validate and build.
    config.validate().map_err(EngineError::from)?;
    let mut sim: Simulation<Replicator> = Simulation::new(&config).map_err(EngineError::from)?;

    // 4. Seed.
    let seeded = seeding::seed_population(&mut sim, &config.seeding)?;
    info!(founders = seeded.slots.len(), "Population seeded");

    // 5. Run.
    let summary = runner::run(&mut sim, config.world.updates).map_err(EngineError::from)?;

    // 6. Report.
    runner::log_run_end(&summary);
    if config.logging.print_grid {
        for population in sim.populations() {
            if let Some(grid) = sim.render_grid(population.id()) {
                println!("population {} ({}):\n{grid}", population.id(), population.name());
            }
        }
    }
    let json = serde_json::to_string_pretty(&summary).map_err(EngineError::from)?;
    println!("{json}");

    Ok(())
}

/// Load configuration from `ration-config.yaml`.
///
/// Returns the configuration and whether it came from the file. Runs before
/// logging is initialized, so the caller reports which source was used.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok((config, true))
    } else {
        let mut config = SimulationConfig::default();
        config.world.apply_env_overrides()?;
        Ok((config, false))
    }
}
