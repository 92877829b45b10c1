//! A minimal self-copying organism.
//!
//! [`Replicator`] stands in for a real digital organism when wiring the
//! scheduler end to end. Each step increments its instruction counter;
//! every `copy_interval` steps it produces an identical child. Merit is
//! whatever was assigned at creation (or later through `set_trait`); the
//! replicator never changes it on its own.

use std::collections::BTreeMap;

use rand::RngCore;
use ration_types::{TraitValue, names};
use serde::{Deserialize, Serialize};

use crate::organism::{Organism, StepOutcome};

/// A trait-map organism that copies itself on a fixed period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replicator {
    /// Named trait storage.
    traits: BTreeMap<String, TraitValue>,
    /// Steps between copies. Zero disables reproduction.
    copy_interval: u64,
    /// Steps executed since the last copy.
    steps_since_copy: u64,
}

impl Replicator {
    /// Create a replicator carrying the default trait set.
    ///
    /// The organism starts with `merit`, `genome_length`, an instruction
    /// counter of zero, a parent merit equal to `merit`, and the
    /// needs-reset flag raised.
    pub fn new(genome_length: u64, copy_interval: u64, merit: f64) -> Self {
        let mut traits = BTreeMap::new();
        traits.insert(names::MERIT.to_owned(), TraitValue::Float(merit));
        traits.insert(names::PARENT_MERIT.to_owned(), TraitValue::Float(merit));
        traits.insert(names::INSTS_EXECUTED.to_owned(), TraitValue::Int(0));
        traits.insert(names::GENOME_LENGTH.to_owned(), TraitValue::Int(genome_length));
        traits.insert(names::NEEDS_RESET.to_owned(), TraitValue::Bool(true));
        Self {
            traits,
            copy_interval,
            steps_since_copy: 0,
        }
    }

    /// Builder-style trait override.
    #[must_use]
    pub fn with_trait(mut self, name: &str, value: impl Into<TraitValue>) -> Self {
        self.traits.insert(name.to_owned(), value.into());
        self
    }

    /// Builder-style trait removal.
    #[must_use]
    pub fn without_trait(mut self, name: &str) -> Self {
        self.traits.remove(name);
        self
    }

    /// Steps between copies.
    pub const fn copy_interval(&self) -> u64 {
        self.copy_interval
    }

    /// Number of instructions executed so far.
    pub fn insts_executed(&self) -> u64 {
        self.traits
            .get(names::INSTS_EXECUTED)
            .map_or(0, |value| value.as_u64())
    }

    /// Build the child produced by a copy: same traits, fresh counters.
    fn offspring(&self) -> Self {
        let mut child = self.clone();
        child.steps_since_copy = 0;
        child
            .traits
            .insert(names::INSTS_EXECUTED.to_owned(), TraitValue::Int(0));
        child
            .traits
            .insert(names::NEEDS_RESET.to_owned(), TraitValue::Bool(true));
        child
    }
}

impl Organism for Replicator {
    fn process_step(&mut self, _rng: &mut dyn RngCore) -> StepOutcome<Self> {
        let executed = self.insts_executed().saturating_add(1);
        self.traits
            .insert(names::INSTS_EXECUTED.to_owned(), TraitValue::Int(executed));

        if self.copy_interval == 0 {
            return StepOutcome::Continue;
        }
        self.steps_since_copy = self.steps_since_copy.saturating_add(1);
        if self.steps_since_copy >= self.copy_interval {
            self.steps_since_copy = 0;
            return StepOutcome::Offspring(self.offspring());
        }
        StepOutcome::Continue
    }

    fn get_trait(&self, name: &str) -> Option<TraitValue> {
        self.traits.get(name).copied()
    }

    fn set_trait(&mut self, name: &str, value: TraitValue) {
        self.traits.insert(name.to_owned(), value);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn new_carries_default_traits() {
        let org = Replicator::new(10, 5, 2.0);
        assert!(org.has_trait(names::MERIT));
        assert!(org.has_trait(names::PARENT_MERIT));
        assert_eq!(org.get_trait(names::GENOME_LENGTH), Some(TraitValue::Int(10)));
        assert_eq!(org.insts_executed(), 0);
        assert_eq!(org.get_trait(names::NEEDS_RESET), Some(TraitValue::Bool(true)));
    }

    #[test]
    fn each_step_counts_one_instruction() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut org = Replicator::new(10, 0, 1.0);
        for _ in 0..7 {
            assert_eq!(org.process_step(&mut rng), StepOutcome::Continue);
        }
        assert_eq!(org.insts_executed(), 7);
    }

    #[test]
    fn copies_on_period() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut org = Replicator::new(10, 3, 4.0);
        assert!(!org.process_step(&mut rng).is_offspring());
        assert!(!org.process_step(&mut rng).is_offspring());
        let child = match org.process_step(&mut rng) {
            StepOutcome::Offspring(child) => Some(child),
            StepOutcome::Continue => None,
        };
        let child = child.unwrap();
        assert_eq!(child.insts_executed(), 0);
        assert_eq!(child.get_trait(names::MERIT), Some(TraitValue::Float(4.0)));
        assert_eq!(org.insts_executed(), 3);
        // Period restarts after a copy.
        assert!(!org.process_step(&mut rng).is_offspring());
    }

    #[test]
    fn builder_overrides_and_removes() {
        let org = Replicator::new(10, 0, 1.0)
            .with_trait(names::MERIT, 9.5)
            .without_trait(names::PARENT_MERIT);
        assert_eq!(org.get_trait(names::MERIT), Some(TraitValue::Float(9.5)));
        assert!(!org.has_trait(names::PARENT_MERIT));
    }

    #[test]
    fn serializes_trait_map() {
        let org = Replicator::new(4, 2, 1.5);
        let json = serde_json::to_string(&org);
        assert!(json.is_ok());
        let back: Result<Replicator, _> = serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(back.ok(), Some(org));
    }
}
