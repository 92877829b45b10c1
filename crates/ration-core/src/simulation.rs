//! The simulation orchestrator.
//!
//! A [`Simulation`] owns every population, the placement registry, the
//! lottery scheduler and the seeded random number generator. It is the
//! single entry point for mutating populations from outside a round:
//! injections, kills and swaps go through here so the scheduler's hooks
//! fire for the population it runs and stay silent for the others.

use rand::SeedableRng;
use rand::rngs::StdRng;
use ration_population::{Organism, Population};
use ration_types::PopulationId;
use ration_world::PlacementRegistry;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::lifecycle::{self, LifecycleHooks, NoHooks};
use crate::scheduler::{LotteryScheduler, ScheduleOutcome};

/// Populations, placement, scheduling and randomness for one run.
#[derive(Debug)]
pub struct Simulation<O: Organism> {
    /// Name used in logs.
    name: String,
    /// Every population, addressed by id.
    populations: Vec<Population<O>>,
    /// Placement policies for births and injections.
    placements: PlacementRegistry,
    /// Scheduler for the target population.
    scheduler: LotteryScheduler,
    /// Source of every random draw in the run.
    rng: StdRng,
    /// Number of updates executed.
    update: u64,
}

impl<O: Organism> Simulation<O> {
    /// Build a simulation from validated configuration.
    ///
    /// Populations start empty; entry `i` of `config.populations` gets id
    /// `i`. The random number generator is seeded from `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if validation fails, or
    /// [`SimulationError::World`] if a placement policy cannot be built.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let populations = config
            .populations
            .iter()
            .zip(0_u32..)
            .map(|(entry, raw)| Population::new(PopulationId::new(raw), entry.name.clone()))
            .collect();
        let placements = PlacementRegistry::from_specs(&config.placement)?;
        let scheduler = LotteryScheduler::new(config.scheduler.clone());
        info!(
            world = %config.world.name,
            seed = config.world.seed,
            populations = config.populations.len(),
            placement_policies = placements.len(),
            scheduled_population = %scheduler.target(),
            "Simulation initialized"
        );
        Self::from_parts(
            config.world.name.clone(),
            populations,
            placements,
            scheduler,
            config.world.seed,
        )
    }

    /// Assemble a simulation from prebuilt pieces.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownPopulation`] if the scheduler
    /// targets a population not in `populations`.
    pub fn from_parts(
        name: impl Into<String>,
        populations: Vec<Population<O>>,
        placements: PlacementRegistry,
        scheduler: LotteryScheduler,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let target = scheduler.target();
        if !populations.iter().any(|p| p.id() == target) {
            return Err(SimulationError::UnknownPopulation(target));
        }
        Ok(Self {
            name: name.into(),
            populations,
            placements,
            scheduler,
            rng: StdRng::seed_from_u64(seed),
            update: 0,
        })
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of updates executed so far.
    pub const fn update_count(&self) -> u64 {
        self.update
    }

    /// Every population.
    pub fn populations(&self) -> &[Population<O>] {
        &self.populations
    }

    /// Look up a population.
    pub fn population(&self, id: PopulationId) -> Option<&Population<O>> {
        self.populations.iter().find(|p| p.id() == id)
    }

    /// The population the scheduler runs.
    pub fn scheduled_population(&self) -> Option<&Population<O>> {
        self.population(self.scheduler.target())
    }

    /// The scheduler.
    pub const fn scheduler(&self) -> &LotteryScheduler {
        &self.scheduler
    }

    /// The placement registry.
    pub const fn placements(&self) -> &PlacementRegistry {
        &self.placements
    }

    /// Current total scheduling weight.
    pub fn total_weight(&mut self) -> f64 {
        self.scheduler.total_weight()
    }

    /// Place an organism from outside into population `id`.
    ///
    /// Organisms headed for the scheduled population must carry every
    /// trait the scheduler reads.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::MissingTrait`] for an organism lacking a
    /// required trait, [`SimulationError::UnknownPopulation`] for a bad id,
    /// or [`SimulationError::NoPlacement`] if no policy manages the
    /// population.
    pub fn inject(&mut self, id: PopulationId, organism: O) -> Result<usize, SimulationError> {
        let scheduled = id == self.scheduler.target();
        if scheduled
            && let Some(missing) = self
                .scheduler
                .config()
                .required_traits()
                .into_iter()
                .find(|name| !organism.has_trait(name))
        {
            return Err(SimulationError::MissingTrait {
                population: id,
                trait_name: missing.to_owned(),
            });
        }

        let population = find_mut(&mut self.populations, id)?;
        let mut no_hooks = NoHooks;
        let hooks: &mut dyn LifecycleHooks<O> = if scheduled {
            &mut self.scheduler
        } else {
            &mut no_hooks
        };
        let slot = lifecycle::inject(hooks, population, &self.placements, organism, &mut self.rng)?
            .ok_or(SimulationError::NoPlacement(id))?;
        debug!(population = %id, slot, "Organism injected");
        Ok(slot)
    }

    /// Run one scheduling round on the scheduled population.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Schedule`] if the round hits a broken
    /// invariant.
    pub fn update(&mut self) -> Result<ScheduleOutcome, SimulationError> {
        let target = self.scheduler.target();
        let population = find_mut(&mut self.populations, target)?;
        let outcome = self
            .scheduler
            .schedule(population, &self.placements, &mut self.rng)?;
        self.update = self.update.saturating_add(1);
        Ok(outcome)
    }

    /// Kill the organism in `slot` of population `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownPopulation`] for a bad id, or a
    /// schedule error for a slot out of range.
    pub fn clear_slot(&mut self, id: PopulationId, slot: usize) -> Result<Option<O>, SimulationError> {
        let scheduled = id == self.scheduler.target();
        let population = find_mut(&mut self.populations, id)?;
        let removed = if scheduled {
            lifecycle::clear_slot(&mut self.scheduler, population, slot)?
        } else {
            lifecycle::clear_slot(&mut NoHooks, population, slot)?
        };
        Ok(removed)
    }

    /// Exchange two slots of population `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownPopulation`] for a bad id, or a
    /// schedule error for a slot out of range.
    pub fn swap_slots(&mut self, id: PopulationId, a: usize, b: usize) -> Result<(), SimulationError> {
        let scheduled = id == self.scheduler.target();
        let population = find_mut(&mut self.populations, id)?;
        if scheduled {
            lifecycle::swap_slots(&mut self.scheduler, population, a, b)?;
        } else {
            lifecycle::swap_slots(&mut NoHooks, population, a, b)?;
        }
        Ok(())
    }

    /// Step selected organisms of population `id` outside the lottery.
    ///
    /// See [`LotteryScheduler::evaluate`].
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownPopulation`] for a bad id, or a
    /// schedule error if placing an offspring fails.
    pub fn evaluate(
        &mut self,
        id: PopulationId,
        slots: &[usize],
        max_steps: usize,
        stop_at_birth: bool,
    ) -> Result<usize, SimulationError> {
        let population = find_mut(&mut self.populations, id)?;
        Ok(self.scheduler.evaluate(
            population,
            slots,
            max_steps,
            stop_at_birth,
            &self.placements,
            &mut self.rng,
        )?)
    }

    /// Text occupancy grid of population `id`, if a grid policy manages it.
    pub fn render_grid(&self, id: PopulationId) -> Option<String> {
        self.population(id)
            .and_then(|population| self.placements.render(population))
    }
}

fn find_mut<O>(
    populations: &mut [Population<O>],
    id: PopulationId,
) -> Result<&mut Population<O>, SimulationError> {
    populations
        .iter_mut()
        .find(|p| p.id() == id)
        .ok_or(SimulationError::UnknownPopulation(id))
}
