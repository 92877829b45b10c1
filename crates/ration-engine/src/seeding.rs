//! Seeding the simulation with its founding organisms.
//!
//! Before the first update the engine injects `seeding.count` identical
//! [`Replicator`]s into the configured population. Where each one lands is
//! up to the population's placement policy: uniform replacement appends
//! them side by side, neighbor placement scatters them over the grid.

use ration_core::Simulation;
use ration_core::config::SeedingConfig;
use ration_population::Replicator;
use tracing::info;

use crate::error::EngineError;

/// Slots the founders were placed in, in injection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedResult {
    /// One slot per injected organism.
    pub slots: Vec<usize>,
}

/// Inject the founding organisms.
///
/// # Errors
///
/// Returns [`EngineError::Seeding`] if the config asks for zero-length
/// genomes, or [`EngineError::Simulation`] if an injection fails.
pub fn seed_population(
    sim: &mut Simulation<Replicator>,
    config: &SeedingConfig,
) -> Result<SeedResult, EngineError> {
    if config.count > 0 && config.genome_length == 0 {
        return Err(EngineError::Seeding {
            message: String::from("seed organisms need a genome length of at least 1"),
        });
    }

    let mut slots = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let founder = Replicator::new(config.genome_length, config.copy_interval, config.merit);
        slots.push(sim.inject(config.population, founder)?);
    }

    info!(
        population = %config.population,
        count = slots.len(),
        genome_length = config.genome_length,
        copy_interval = config.copy_interval,
        merit = config.merit,
        "Seed organisms injected"
    );
    Ok(SeedResult { slots })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ration_core::SimulationConfig;
    use ration_types::PopulationId;

    use super::*;

    fn sim() -> Simulation<Replicator> {
        Simulation::new(&SimulationConfig::default()).unwrap()
    }

    #[test]
    fn injects_requested_count() {
        let mut sim = sim();
        let config = SeedingConfig {
            count: 4,
            ..SeedingConfig::default()
        };
        let result = seed_population(&mut sim, &config).unwrap();
        assert_eq!(result.slots, vec![0, 1, 2, 3]);
        assert_eq!(sim.scheduled_population().unwrap().live_count(), 4);
    }

    #[test]
    fn zero_count_is_a_no_op() {
        let mut sim = sim();
        let config = SeedingConfig {
            count: 0,
            genome_length: 0,
            ..SeedingConfig::default()
        };
        let result = seed_population(&mut sim, &config).unwrap();
        assert!(result.slots.is_empty());
    }

    #[test]
    fn rejects_empty_genomes() {
        let mut sim = sim();
        let config = SeedingConfig {
            genome_length: 0,
            ..SeedingConfig::default()
        };
        assert!(matches!(
            seed_population(&mut sim, &config),
            Err(EngineError::Seeding { .. })
        ));
    }

    #[test]
    fn unknown_population_is_a_simulation_error() {
        let mut sim = sim();
        let config = SeedingConfig {
            population: PopulationId::new(3),
            ..SeedingConfig::default()
        };
        assert!(matches!(
            seed_population(&mut sim, &config),
            Err(EngineError::Simulation { .. })
        ));
    }
}
