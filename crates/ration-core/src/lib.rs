//! Lottery scheduling and simulation orchestration for Ration.
//!
//! This crate decides *who runs next*. A [`LotteryScheduler`] hands out
//! single execution steps to the organisms of one population with
//! probability proportional to a weight derived from each organism's merit,
//! falling back to uniform draws when every weight is zero, and optionally
//! evicting organisms that outlive their age limit.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration ([`SimulationConfig`]) and validation
//! - [`error`] -- [`ScheduleError`] and the top-level [`SimulationError`]
//! - [`lifecycle`] -- The [`LifecycleHooks`] contract and the glue that fires
//!   hooks around births, injections, deaths and swaps
//! - [`runner`] -- Bounded runs producing a [`RunSummary`]
//! - [`scheduler`] -- [`LotteryScheduler`], round reports, and `evaluate`
//! - [`simulation`] -- [`Simulation`], owner of populations, placement,
//!   scheduler and the seeded RNG
//! - [`weighted_index`] -- [`WeightedIndex`], a Fenwick tree over slot weights

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod runner;
pub mod scheduler;
pub mod simulation;
pub mod weighted_index;

// Re-export primary types at crate root.
pub use config::{ConfigError, SchedulerConfig, SimulationConfig};
pub use error::{ScheduleError, SimulationError};
pub use lifecycle::{LifecycleHooks, NoHooks};
pub use runner::{EndReason, RunSummary, run};
pub use scheduler::{LotteryScheduler, RoundReport, ScheduleOutcome};
pub use simulation::Simulation;
pub use weighted_index::{WeightedIndex, WeightedIndexError};
