//! Hook dispatch around population mutations.
//!
//! Every change to a scheduled population goes through one of the
//! functions here so the weight map never falls out of step with the slots
//! it prices:
//!
//! | Mutation        | Hook order                                                        |
//! |-----------------|-------------------------------------------------------------------|
//! | [`place_birth`] | `before_repro(parent)`, placement, `before_death(slot)` if occupied, insert, `on_placement(slot)` |
//! | [`inject`]      | placement, `before_death(slot)` if occupied, insert, `on_placement(slot)` |
//! | [`clear_slot`]  | `before_death(slot)` if occupied, clear                           |
//! | [`swap_slots`]  | swap, `on_swap(a, b)`                                             |
//!
//! Populations not run by a scheduler use [`NoHooks`].

use rand::RngCore;
use ration_population::{Organism, Population};
use ration_world::PlacementRegistry;
use tracing::debug;

use crate::error::ScheduleError;

/// Callbacks fired around population mutations.
pub trait LifecycleHooks<O: Organism> {
    /// An organism was just written into `slot`.
    fn on_placement(&mut self, population: &mut Population<O>, slot: usize)
    -> Result<(), ScheduleError>;

    /// The organism in `slot` is about to be removed or overwritten.
    fn before_death(&mut self, slot: usize) -> Result<(), ScheduleError>;

    /// The organism in `parent` has produced offspring that is about to be
    /// placed.
    fn before_repro(
        &mut self,
        population: &mut Population<O>,
        parent: usize,
    ) -> Result<(), ScheduleError>;

    /// The contents of slots `a` and `b` were just exchanged.
    fn on_swap(&mut self, a: usize, b: usize) -> Result<(), ScheduleError>;
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<O: Organism> LifecycleHooks<O> for NoHooks {
    fn on_placement(&mut self, _: &mut Population<O>, _: usize) -> Result<(), ScheduleError> {
        Ok(())
    }

    fn before_death(&mut self, _: usize) -> Result<(), ScheduleError> {
        Ok(())
    }

    fn before_repro(&mut self, _: &mut Population<O>, _: usize) -> Result<(), ScheduleError> {
        Ok(())
    }

    fn on_swap(&mut self, _: usize, _: usize) -> Result<(), ScheduleError> {
        Ok(())
    }
}

/// Place a child of the organism in `parent`.
///
/// Returns the slot the child landed in, or `None` if no placement policy
/// manages the population (the child is dropped).
pub fn place_birth<O, H>(
    hooks: &mut H,
    population: &mut Population<O>,
    placements: &PlacementRegistry,
    parent: usize,
    child: O,
    rng: &mut dyn RngCore,
) -> Result<Option<usize>, ScheduleError>
where
    O: Organism,
    H: LifecycleHooks<O> + ?Sized,
{
    hooks.before_repro(population, parent)?;
    let Some(slot) = placements.place_birth(parent, population, rng) else {
        debug!(
            population = %population.id(),
            parent,
            "No placement for offspring, dropping it"
        );
        return Ok(None);
    };
    settle(hooks, population, slot, child).map(Some)
}

/// Place an organism arriving from outside the population.
///
/// Returns the slot the organism landed in, or `None` if no placement
/// policy manages the population.
pub fn inject<O, H>(
    hooks: &mut H,
    population: &mut Population<O>,
    placements: &PlacementRegistry,
    organism: O,
    rng: &mut dyn RngCore,
) -> Result<Option<usize>, ScheduleError>
where
    O: Organism,
    H: LifecycleHooks<O> + ?Sized,
{
    let Some(slot) = placements.place_inject(population, rng) else {
        return Ok(None);
    };
    settle(hooks, population, slot, organism).map(Some)
}

/// Kill the organism in `slot`, if any, and return it.
pub fn clear_slot<O, H>(
    hooks: &mut H,
    population: &mut Population<O>,
    slot: usize,
) -> Result<Option<O>, ScheduleError>
where
    O: Organism,
    H: LifecycleHooks<O> + ?Sized,
{
    if population.is_occupied(slot) {
        hooks.before_death(slot)?;
    }
    Ok(population.clear(slot)?)
}

/// Exchange the contents of two slots.
pub fn swap_slots<O, H>(
    hooks: &mut H,
    population: &mut Population<O>,
    a: usize,
    b: usize,
) -> Result<(), ScheduleError>
where
    O: Organism,
    H: LifecycleHooks<O> + ?Sized,
{
    population.swap(a, b)?;
    hooks.on_swap(a, b)
}

/// Write `organism` into `slot`, retiring any occupant first.
fn settle<O, H>(
    hooks: &mut H,
    population: &mut Population<O>,
    slot: usize,
    organism: O,
) -> Result<usize, ScheduleError>
where
    O: Organism,
    H: LifecycleHooks<O> + ?Sized,
{
    if population.is_occupied(slot) {
        hooks.before_death(slot)?;
    }
    population.insert(slot, organism)?;
    hooks.on_placement(population, slot)?;
    Ok(slot)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ration_population::Replicator;
    use ration_types::PopulationId;
    use ration_world::UniformReplacement;

    use super::*;

    /// Records hook calls in order.
    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl LifecycleHooks<Replicator> for Recorder {
        fn on_placement(
            &mut self,
            _: &mut Population<Replicator>,
            slot: usize,
        ) -> Result<(), ScheduleError> {
            self.calls.push(format!("on_placement({slot})"));
            Ok(())
        }

        fn before_death(&mut self, slot: usize) -> Result<(), ScheduleError> {
            self.calls.push(format!("before_death({slot})"));
            Ok(())
        }

        fn before_repro(
            &mut self,
            _: &mut Population<Replicator>,
            parent: usize,
        ) -> Result<(), ScheduleError> {
            self.calls.push(format!("before_repro({parent})"));
            Ok(())
        }

        fn on_swap(&mut self, a: usize, b: usize) -> Result<(), ScheduleError> {
            self.calls.push(format!("on_swap({a},{b})"));
            Ok(())
        }
    }

    fn uniform() -> PlacementRegistry {
        let mut registry = PlacementRegistry::new();
        registry.register(Box::new(UniformReplacement::new(BTreeSet::from([
            PopulationId::new(0),
        ]))));
        registry
    }

    fn org() -> Replicator {
        Replicator::new(10, 0, 1.0)
    }

    #[test]
    fn inject_fires_on_placement_only() {
        let mut hooks = Recorder::default();
        let mut population = Population::new(PopulationId::new(0), "main");
        let mut rng = StdRng::seed_from_u64(1);
        let slot = inject(&mut hooks, &mut population, &uniform(), org(), &mut rng).unwrap();
        assert_eq!(slot, Some(0));
        assert_eq!(hooks.calls, vec!["on_placement(0)"]);
        assert_eq!(population.live_count(), 1);
    }

    #[test]
    fn birth_over_occupant_fires_full_sequence() {
        let mut hooks = Recorder::default();
        let mut population = Population::new(PopulationId::new(0), "main");
        let registry = uniform();
        let mut rng = StdRng::seed_from_u64(1);
        inject(&mut NoHooks, &mut population, &registry, org(), &mut rng).unwrap();
        inject(&mut NoHooks, &mut population, &registry, org(), &mut rng).unwrap();

        let slot = place_birth(&mut hooks, &mut population, &registry, 0, org(), &mut rng).unwrap();
        assert_eq!(slot, Some(1));
        assert_eq!(
            hooks.calls,
            vec!["before_repro(0)", "before_death(1)", "on_placement(1)"]
        );
        assert_eq!(population.live_count(), 2);
    }

    #[test]
    fn unmanaged_birth_is_dropped() {
        let mut hooks = Recorder::default();
        let mut population = Population::with_empty_slots(PopulationId::new(5), "other", 2);
        population.insert(0, org()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let slot = place_birth(&mut hooks, &mut population, &uniform(), 0, org(), &mut rng).unwrap();
        assert_eq!(slot, None);
        assert_eq!(hooks.calls, vec!["before_repro(0)"]);
        assert_eq!(population.live_count(), 1);
    }

    #[test]
    fn clearing_a_hole_skips_before_death() {
        let mut hooks = Recorder::default();
        let mut population = Population::with_empty_slots(PopulationId::new(0), "main", 2);
        population.insert(1, org()).unwrap();

        assert!(clear_slot(&mut hooks, &mut population, 0).unwrap().is_none());
        assert!(clear_slot(&mut hooks, &mut population, 1).unwrap().is_some());
        assert_eq!(hooks.calls, vec!["before_death(1)"]);
        assert!(population.is_extinct());
    }

    #[test]
    fn swap_fires_after_moving() {
        let mut hooks = Recorder::default();
        let mut population = Population::with_empty_slots(PopulationId::new(0), "main", 3);
        population.insert(0, org()).unwrap();
        swap_slots(&mut hooks, &mut population, 0, 2).unwrap();
        assert!(population.is_occupied(2));
        assert!(!population.is_occupied(0));
        assert_eq!(hooks.calls, vec!["on_swap(0,2)"]);
        assert!(swap_slots(&mut hooks, &mut population, 0, 9).is_err());
    }
}
