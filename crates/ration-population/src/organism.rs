//! The organism contract consumed by the scheduler.
//!
//! An organism is opaque to the scheduler apart from two capabilities:
//! executing a single unit of work, and exposing named scalar traits. What
//! a "unit of work" means (one virtual CPU instruction, one behaviour
//! tick, ...) is entirely up to the implementation.
//!
//! Reproduction is reported back through [`StepOutcome::Offspring`]
//! instead of being performed by the organism itself. The caller owns the
//! population and the placement policies, so it is the caller that finds a
//! slot for the child and fires the lifecycle hooks.

use rand::RngCore;
use ration_types::TraitValue;

/// Result of executing one step on an organism.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<O> {
    /// Nothing observable happened beyond the organism's own state change.
    Continue,
    /// The organism produced a child that must be placed.
    Offspring(O),
}

impl<O> StepOutcome<O> {
    /// Whether this step produced a child.
    pub const fn is_offspring(&self) -> bool {
        matches!(self, Self::Offspring(_))
    }
}

/// An agent that can be scheduled.
pub trait Organism: Sized {
    /// Execute exactly one unit of work.
    fn process_step(&mut self, rng: &mut dyn RngCore) -> StepOutcome<Self>;

    /// Read a named trait. Returns `None` if the organism does not carry it.
    fn get_trait(&self, name: &str) -> Option<TraitValue>;

    /// Write a named trait, creating it if absent.
    fn set_trait(&mut self, name: &str, value: TraitValue);

    /// Whether the organism carries the named trait.
    fn has_trait(&self, name: &str) -> bool {
        self.get_trait(name).is_some()
    }
}
