//! Organisms and populations for the Ration workspace.
//!
//! The scheduler and placement policies treat organisms and their slot
//! arrays as external collaborators. This crate defines the contract they
//! consume and a plain in-memory implementation of it.
//!
//! # Modules
//!
//! - [`error`] -- Error types for slot operations ([`PopulationError`])
//! - [`organism`] -- The [`Organism`] trait and [`StepOutcome`]
//! - [`population`] -- [`Population`], a growable array of optional slots,
//!   and the object-safe [`SlotArray`] view used by placement
//! - [`replicator`] -- [`Replicator`], a minimal self-copying organism

pub mod error;
pub mod organism;
pub mod population;
pub mod replicator;

// Re-export primary types at crate root for convenience.
pub use error::PopulationError;
pub use organism::{Organism, StepOutcome};
pub use population::{Population, SlotArray};
pub use replicator::Replicator;
