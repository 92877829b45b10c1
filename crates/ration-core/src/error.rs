//! Error types for the `ration-core` crate.
//!
//! [`ScheduleError`] covers failures inside a scheduling round or a
//! lifecycle hook. [`SimulationError`] is the orchestrator-level error that
//! wraps every subsystem error plus setup problems such as an organism
//! injected without the traits the scheduler reads.

use ration_population::PopulationError;
use ration_types::PopulationId;
use ration_world::WorldError;

use crate::config::ConfigError;
use crate::weighted_index::WeightedIndexError;

/// Errors raised while scheduling or dispatching lifecycle hooks.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The weight map rejected an update or a sample.
    #[error("weight map error: {source}")]
    Weights {
        /// The underlying weight map error.
        #[from]
        source: WeightedIndexError,
    },

    /// A slot operation on the population failed.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },

    /// The scheduler was handed a population other than the one it runs.
    #[error("scheduler runs population {expected}, was given population {actual}")]
    WrongPopulation {
        /// The population the scheduler was configured for.
        expected: PopulationId,
        /// The population that was passed in.
        actual: PopulationId,
    },
}

/// Errors from building or driving a [`Simulation`](crate::Simulation).
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Configuration could not be loaded or failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A placement policy could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A scheduling round or hook failed.
    #[error("schedule error: {source}")]
    Schedule {
        /// The underlying schedule error.
        #[from]
        source: ScheduleError,
    },

    /// A slot operation failed outside a round.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },

    /// No population with this id exists.
    #[error("unknown population {0}")]
    UnknownPopulation(PopulationId),

    /// An organism lacks a trait the scheduler needs.
    #[error("organism injected into population {population} lacks required trait `{trait_name}`")]
    MissingTrait {
        /// The population the organism was headed for.
        population: PopulationId,
        /// The missing trait.
        trait_name: String,
    },

    /// No placement policy manages the population.
    #[error("no placement policy manages population {0}")]
    NoPlacement(PopulationId),
}
