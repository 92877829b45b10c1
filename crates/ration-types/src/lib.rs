//! Shared type definitions for the Ration workspace.
//!
//! This crate holds the small vocabulary shared by the population, world,
//! and core crates: population identifiers, organism trait values, the
//! grid neighborhood kinds, and the well-known trait names the scheduler
//! reads by default.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers
//! - [`enums`] -- Neighborhood kinds and scheduling budget basis
//! - [`traits`] -- [`TraitValue`] and default trait names

pub mod enums;
pub mod ids;
pub mod traits;

// Re-export all public types at crate root for convenience.
pub use enums::{BudgetBasis, Neighborhood};
pub use ids::PopulationId;
pub use traits::{TraitValue, names};
