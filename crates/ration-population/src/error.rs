//! Error types for the `ration-population` crate.

use ration_types::PopulationId;

/// Errors that can occur during slot operations on a population.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// A slot index was at or beyond the population size.
    #[error("slot {slot} out of range for population {population} (size {size})")]
    SlotOutOfRange {
        /// The population that was addressed.
        population: PopulationId,
        /// The requested slot.
        slot: usize,
        /// The population size at the time of the call.
        size: usize,
    },

    /// The live-organism counter would overflow or underflow.
    #[error("live count out of sync in population {0}")]
    LiveCountOutOfSync(PopulationId),
}
