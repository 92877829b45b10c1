//! Merit-proportional lottery scheduling.
//!
//! Each round the [`LotteryScheduler`] spends a budget of single steps on
//! its target population. Every step is a lottery draw: a slot wins with
//! probability proportional to its weight, where an organism's weight is
//!
//! ```text
//! weight = max(0, base_value + merit_scale_factor * merit)
//! ```
//!
//! When every weight is zero the draw falls back to a uniform pick over all
//! slots, so a population of zero-merit organisms still runs. The choice
//! between the two is made per draw; there is no sticky warm/cold mode.
//!
//! With `death_age >= 0` the scheduler also evicts any organism that has
//! executed at least `death_age * genome_length` instructions, checked
//! right after the organism's step.
//!
//! The scheduler keeps its weights current through the four
//! [`LifecycleHooks`]. Anything that mutates the target population must go
//! through [`crate::lifecycle`] (or [`crate::Simulation`], which does).

use rand::{Rng, RngCore};
use ration_population::{Organism, Population, StepOutcome};
use ration_types::{BudgetBasis, PopulationId, TraitValue};
use ration_world::PlacementRegistry;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::lifecycle::{self, LifecycleHooks, NoHooks};
use crate::weighted_index::{WeightedIndex, WeightedIndexError};

/// Statistics for one completed round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundReport {
    /// Steps the round was allowed.
    pub budget: u64,
    /// Steps actually drawn (less than `budget` if the population died out).
    pub steps: u64,
    /// Draws made uniformly because the total weight was zero.
    pub cold_draws: u64,
    /// Offspring placed into the population.
    pub births: u64,
    /// Offspring dropped because no policy placed them.
    pub lost_births: u64,
    /// Organisms removed for reaching their age limit.
    pub evictions: u64,
    /// Total weight after the round.
    pub total_weight: f64,
}

impl RoundReport {
    /// Whether any draw in the round was uniform.
    pub const fn ran_cold(&self) -> bool {
        self.cold_draws > 0
    }
}

/// Result of one call to [`LotteryScheduler::schedule`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScheduleOutcome {
    /// The population had no live organisms; nothing ran.
    EmptyPopulation,
    /// The round ran.
    Completed(RoundReport),
}

impl ScheduleOutcome {
    /// Total weight after the round; zero for an empty population.
    pub const fn total_weight(&self) -> f64 {
        match self {
            Self::EmptyPopulation => 0.0,
            Self::Completed(report) => report.total_weight,
        }
    }

    /// The round statistics, if the round ran.
    pub const fn report(&self) -> Option<&RoundReport> {
        match self {
            Self::EmptyPopulation => None,
            Self::Completed(report) => Some(report),
        }
    }
}

/// Weighted lottery over the slots of one population.
#[derive(Debug, Clone)]
pub struct LotteryScheduler {
    /// Settings the scheduler was built with.
    config: SchedulerConfig,
    /// One weight per slot of the target population.
    weights: WeightedIndex,
}

impl LotteryScheduler {
    /// Create a scheduler with an empty weight map.
    ///
    /// The map is sized on the first placement hook, or lazily on the
    /// first round with `initial_weight` per slot.
    pub const fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            weights: WeightedIndex::new(),
        }
    }

    /// The settings this scheduler runs with.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The population this scheduler runs.
    pub const fn target(&self) -> PopulationId {
        self.config.population
    }

    /// Read-only view of the weight map.
    pub const fn weights(&self) -> &WeightedIndex {
        &self.weights
    }

    /// Current total weight, resolving any deferred refresh.
    pub fn total_weight(&mut self) -> f64 {
        self.weights.total_weight()
    }

    /// Weight for an organism with `merit`.
    pub fn price(&self, merit: f64) -> f64 {
        let weight = self
            .config
            .merit_scale_factor
            .mul_add(merit, self.config.base_value);
        if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        }
    }

    /// Number of steps a round over `population` is allowed.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn round_budget<O>(&self, population: &Population<O>) -> u64 {
        let basis = match self.config.budget_basis {
            BudgetBasis::Slots => population.size(),
            BudgetBasis::LiveAgents => population.live_count(),
        };
        let budget = (basis as f64 * self.config.avg_updates).ceil();
        if budget.is_finite() && budget > 0.0 {
            budget as u64
        } else {
            0
        }
    }

    /// Run one round on `population`.
    ///
    /// Offspring produced during the round are placed through
    /// `placements`, with this scheduler's hooks keeping the weights in
    /// sync.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::WrongPopulation`] if `population` is not the
    /// configured target, or a weight map or population error if an
    /// internal invariant breaks mid-round.
    pub fn schedule<O: Organism>(
        &mut self,
        population: &mut Population<O>,
        placements: &PlacementRegistry,
        rng: &mut dyn RngCore,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        self.check_target(population.id())?;
        if population.size() == 0 || population.is_extinct() {
            debug!(population = %population.id(), "Round skipped, no live organisms");
            return Ok(ScheduleOutcome::EmptyPopulation);
        }
        if self.weights.is_empty() {
            self.weights
                .resize(population.size(), self.config.initial_weight)?;
        }
        self.sync_size(population.size())?;

        let budget = self.round_budget(population);
        let mut report = RoundReport {
            budget,
            ..RoundReport::default()
        };

        for _ in 0..budget {
            if population.is_extinct() {
                break;
            }
            let selected = self.draw(population.size(), rng, &mut report)?;
            report.steps = report.steps.saturating_add(1);

            let Some(organism) = population.get_mut(selected) else {
                continue;
            };
            if let StepOutcome::Offspring(child) = organism.process_step(rng) {
                match lifecycle::place_birth(self, population, placements, selected, child, rng)? {
                    Some(_) => report.births = report.births.saturating_add(1),
                    None => report.lost_births = report.lost_births.saturating_add(1),
                }
            }

            if population
                .get(selected)
                .is_some_and(|organism| self.exceeds_age(organism))
            {
                lifecycle::clear_slot(self, population, selected)?;
                report.evictions = report.evictions.saturating_add(1);
            }
        }

        report.total_weight = self.weights.total_weight();
        debug!(
            population = %population.id(),
            budget = report.budget,
            steps = report.steps,
            cold_draws = report.cold_draws,
            births = report.births,
            evictions = report.evictions,
            live = population.live_count(),
            total_weight = report.total_weight,
            "Round complete"
        );
        Ok(ScheduleOutcome::Completed(report))
    }

    /// Step the organisms in `slots` round-robin for up to `max_steps`
    /// steps each.
    ///
    /// Offspring are placed as in a normal round. With `stop_at_birth`,
    /// returns the 1-based step at which the population first grew past
    /// its starting size; otherwise (or if it never grows) runs every step
    /// and returns `max_steps`. Empty slots are skipped.
    ///
    /// Hooks fire only when `population` is this scheduler's target; other
    /// populations are stepped without touching the weight map.
    ///
    /// # Errors
    ///
    /// Returns a schedule error if placing an offspring fails.
    pub fn evaluate<O: Organism>(
        &mut self,
        population: &mut Population<O>,
        slots: &[usize],
        max_steps: usize,
        stop_at_birth: bool,
        placements: &PlacementRegistry,
        rng: &mut dyn RngCore,
    ) -> Result<usize, ScheduleError> {
        if population.id() == self.target() {
            run_evaluation(self, population, slots, max_steps, stop_at_birth, placements, rng)
        } else {
            run_evaluation(
                &mut NoHooks,
                population,
                slots,
                max_steps,
                stop_at_birth,
                placements,
                rng,
            )
        }
    }

    /// Pick the next slot: weighted when any weight is positive, else uniform.
    fn draw(
        &mut self,
        size: usize,
        rng: &mut dyn RngCore,
        report: &mut RoundReport,
    ) -> Result<usize, ScheduleError> {
        let total = self.weights.total_weight();
        if total > 0.0 {
            match self.weights.index(Self::sample(total, rng)) {
                Ok(slot) => return Ok(slot),
                // The index rebuilt itself and its exact total fell short of
                // the drifted one the sample was drawn against.
                Err(WeightedIndexError::SampleOutOfRange { .. }) => {
                    let total = self.weights.total_weight();
                    if total > 0.0 {
                        return Ok(self.weights.index(Self::sample(total, rng))?);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        report.cold_draws = report.cold_draws.saturating_add(1);
        Ok(rng.random_range(0..size))
    }

    /// Uniform point in `[0, total)`.
    fn sample(total: f64, rng: &mut dyn RngCore) -> f64 {
        (rng.random::<f64>() * total).min(total.next_down())
    }

    /// Whether `organism` has used up its lifespan.
    fn exceeds_age<O: Organism>(&self, organism: &O) -> bool {
        if !self.config.age_eviction_enabled() {
            return false;
        }
        let executed = organism.get_trait(&self.config.insts_trait);
        let genome_length = organism.get_trait(&self.config.genome_length_trait);
        let (Some(executed), Some(genome_length)) = (executed, genome_length) else {
            warn!(
                insts_trait = %self.config.insts_trait,
                genome_length_trait = %self.config.genome_length_trait,
                "Organism lacks age traits, skipping eviction check"
            );
            return false;
        };
        executed.as_f64() >= self.config.death_age * genome_length.as_f64()
    }

    /// Read a numeric trait, treating a missing one as zero.
    fn read_merit<O: Organism>(organism: &O, name: &str) -> f64 {
        organism.get_trait(name).map_or_else(
            || {
                warn!(trait_name = name, "Organism lacks merit trait, pricing at zero");
                0.0
            },
            TraitValue::as_f64,
        )
    }

    /// Grow the weight map with zero entries to cover `size` slots.
    fn sync_size(&mut self, size: usize) -> Result<(), ScheduleError> {
        if self.weights.len() < size {
            self.weights.resize(size, 0.0)?;
        }
        Ok(())
    }

    fn check_target(&self, actual: PopulationId) -> Result<(), ScheduleError> {
        if actual == self.target() {
            Ok(())
        } else {
            Err(ScheduleError::WrongPopulation {
                expected: self.target(),
                actual,
            })
        }
    }
}

impl<O: Organism> LifecycleHooks<O> for LotteryScheduler {
    fn on_placement(
        &mut self,
        population: &mut Population<O>,
        slot: usize,
    ) -> Result<(), ScheduleError> {
        self.sync_size(population.size())?;
        let Some(organism) = population.get_mut(slot) else {
            self.weights.adjust(slot, 0.0)?;
            return Ok(());
        };
        let weight = self.price(Self::read_merit(organism, &self.config.merit_trait));
        if organism.has_trait(&self.config.reset_trait) {
            organism.set_trait(&self.config.reset_trait, TraitValue::Bool(false));
        }
        self.weights.adjust(slot, weight)?;
        Ok(())
    }

    fn before_death(&mut self, slot: usize) -> Result<(), ScheduleError> {
        if slot < self.weights.len() {
            self.weights.adjust(slot, 0.0)?;
            self.weights.defer_refresh();
        }
        Ok(())
    }

    fn before_repro(
        &mut self,
        population: &mut Population<O>,
        parent: usize,
    ) -> Result<(), ScheduleError> {
        let Some(parent_trait) = self.config.parent_merit_trait.as_deref() else {
            return Ok(());
        };
        let Some(organism) = population.get_mut(parent) else {
            return Ok(());
        };
        let merit = Self::read_merit(organism, parent_trait);
        organism.set_trait(&self.config.merit_trait, TraitValue::Float(merit));
        let weight = self.price(merit);
        self.sync_size(population.size())?;
        let previous = self.weights.weight(parent).unwrap_or(0.0);
        self.weights.adjust(parent, weight)?;
        if weight < previous {
            self.weights.defer_refresh();
        }
        Ok(())
    }

    fn on_swap(&mut self, a: usize, b: usize) -> Result<(), ScheduleError> {
        self.sync_size(a.max(b).saturating_add(1))?;
        self.weights.swap(a, b)?;
        Ok(())
    }
}

/// Interleave single steps over `slots`, placing offspring through `hooks`.
fn run_evaluation<O, H>(
    hooks: &mut H,
    population: &mut Population<O>,
    slots: &[usize],
    max_steps: usize,
    stop_at_birth: bool,
    placements: &PlacementRegistry,
    rng: &mut dyn RngCore,
) -> Result<usize, ScheduleError>
where
    O: Organism,
    H: LifecycleHooks<O> + ?Sized,
{
    let start_size = population.size();
    for step in 1..=max_steps {
        for &slot in slots {
            let Some(organism) = population.get_mut(slot) else {
                continue;
            };
            if let StepOutcome::Offspring(child) = organism.process_step(rng) {
                lifecycle::place_birth(hooks, population, placements, slot, child, rng)?;
            }
        }
        if stop_at_birth && population.size() > start_size {
            return Ok(step);
        }
    }
    Ok(max_steps)
}
