//! Spatial structure and offspring placement for the Ration workspace.
//!
//! This crate answers "where does a newborn or injected organism go?".
//! Policies are trait objects selected per population at setup time and
//! collected in a [`PlacementRegistry`]; the first policy that manages a
//! population claims its placements.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid and policy construction
//! - [`grid`] -- [`ToroidalGrid`] coordinates, directions, and wraparound
//! - [`neighbor`] -- [`NeighborPlacement`]: births land next to the parent
//!   on a toroidal grid
//! - [`placement`] -- The [`PlacementPolicy`] trait, the registry, and the
//!   configuration-facing [`PlacementSpec`]
//! - [`uniform`] -- [`UniformReplacement`]: births overwrite a random slot,
//!   injections append

pub mod error;
pub mod grid;
pub mod neighbor;
pub mod placement;
pub mod uniform;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::{Direction, ToroidalGrid};
pub use neighbor::NeighborPlacement;
pub use placement::{PlacementPolicy, PlacementRegistry, PlacementSpec};
pub use uniform::UniformReplacement;
