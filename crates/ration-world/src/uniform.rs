//! Uniform random replacement.
//!
//! A birth overwrites a uniformly chosen slot other than the parent's,
//! keeping the population size constant (assuming no other deaths).
//! An injection always appends a fresh empty slot, so injected organisms
//! never displace anyone.

use std::collections::BTreeSet;

use rand::{Rng, RngCore};
use ration_population::SlotArray;
use ration_types::PopulationId;

use crate::placement::PlacementPolicy;

/// Births replace a random other organism; injections append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformReplacement {
    targets: BTreeSet<PopulationId>,
}

impl UniformReplacement {
    /// Name used in logs and errors.
    pub const NAME: &'static str = "uniform";

    /// Create a policy managing `targets`.
    pub const fn new(targets: BTreeSet<PopulationId>) -> Self {
        Self { targets }
    }
}

impl PlacementPolicy for UniformReplacement {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn manages(&self, population: PopulationId) -> bool {
        self.targets.contains(&population)
    }

    fn place_birth(
        &self,
        parent: usize,
        population: &mut dyn SlotArray,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        if !self.manages(population.population_id()) {
            return None;
        }
        let size = population.size();
        match size {
            0 => None,
            // The only slot is the parent's own: the child replaces it.
            1 => Some(0),
            _ if parent >= size => Some(rng.random_range(0..size)),
            _ => {
                // Draw among the size - 1 other slots, skipping over the parent.
                let draw = rng.random_range(0..size.saturating_sub(1));
                Some(if draw >= parent {
                    draw.saturating_add(1)
                } else {
                    draw
                })
            }
        }
    }

    fn place_inject(
        &self,
        population: &mut dyn SlotArray,
        _rng: &mut dyn RngCore,
    ) -> Option<usize> {
        if !self.manages(population.population_id()) {
            return None;
        }
        Some(population.push_empty())
    }
}
