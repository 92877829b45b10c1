//! Bounded simulation runs.
//!
//! [`run`] drives [`Simulation::update`] for a fixed number of updates,
//! stopping early if the scheduled population dies out, and folds the
//! per-round reports into a [`RunSummary`].

use ration_population::Organism;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::SimulationError;
use crate::scheduler::ScheduleOutcome;
use crate::simulation::Simulation;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The requested number of updates ran.
    UpdateLimit,
    /// The scheduled population has no live organisms left.
    Extinction,
}

/// Aggregate statistics of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Why the run stopped.
    pub end_reason: EndReason,
    /// Rounds that actually ran.
    pub updates: u64,
    /// Steps executed across all rounds.
    pub steps: u64,
    /// Steps drawn uniformly because every weight was zero.
    pub cold_draws: u64,
    /// Offspring placed.
    pub births: u64,
    /// Organisms evicted for age.
    pub evictions: u64,
    /// Live organisms in the scheduled population at the end.
    pub final_live: usize,
    /// Slots in the scheduled population at the end.
    pub final_size: usize,
    /// Total scheduling weight at the end.
    pub final_total_weight: f64,
}

/// Run up to `updates` rounds.
///
/// # Errors
///
/// Returns the first [`SimulationError`] raised by a round.
pub fn run<O: Organism>(
    sim: &mut Simulation<O>,
    updates: u64,
) -> Result<RunSummary, SimulationError> {
    info!(simulation = sim.name(), updates, "Simulation starting");

    let mut end_reason = EndReason::UpdateLimit;
    let mut rounds: u64 = 0;
    let mut steps: u64 = 0;
    let mut cold_draws: u64 = 0;
    let mut births: u64 = 0;
    let mut evictions: u64 = 0;

    for _ in 0..updates {
        let report = match sim.update()? {
            ScheduleOutcome::EmptyPopulation => {
                end_reason = EndReason::Extinction;
                break;
            }
            ScheduleOutcome::Completed(report) => report,
        };
        rounds = rounds.saturating_add(1);
        steps = steps.saturating_add(report.steps);
        cold_draws = cold_draws.saturating_add(report.cold_draws);
        births = births.saturating_add(report.births);
        evictions = evictions.saturating_add(report.evictions);

        if sim.scheduled_population().is_none_or(|p| p.is_extinct()) {
            end_reason = EndReason::Extinction;
            break;
        }
    }

    let (final_live, final_size) = sim
        .scheduled_population()
        .map_or((0, 0), |p| (p.live_count(), p.size()));
    Ok(RunSummary {
        end_reason,
        updates: rounds,
        steps,
        cold_draws,
        births,
        evictions,
        final_live,
        final_size,
        final_total_weight: sim.total_weight(),
    })
}

/// Log the final state of a run.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        reason = ?summary.end_reason,
        updates = summary.updates,
        steps = summary.steps,
        births = summary.births,
        evictions = summary.evictions,
        final_live = summary.final_live,
        final_size = summary.final_size,
        final_total_weight = summary.final_total_weight,
        "Simulation ended"
    );
    if summary.end_reason == EndReason::Extinction {
        warn!(updates = summary.updates, "Scheduled population went extinct");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ration_population::Replicator;
    use ration_types::PopulationId;

    use super::*;
    use crate::config::SimulationConfig;

    fn sim_with(config: &SimulationConfig, organisms: usize) -> Simulation<Replicator> {
        let mut sim = Simulation::new(config).unwrap();
        for _ in 0..organisms {
            sim.inject(PopulationId::new(0), Replicator::new(10, 4, 1.0))
                .unwrap();
        }
        sim
    }

    #[test]
    fn runs_to_update_limit() {
        let config = SimulationConfig::default();
        let mut sim = sim_with(&config, 3);
        let summary = run(&mut sim, 5).unwrap();
        assert_eq!(summary.end_reason, EndReason::UpdateLimit);
        assert_eq!(summary.updates, 5);
        assert_eq!(summary.steps, 5 * 3 * 30);
        assert_eq!(summary.final_live, 3);
        assert!(summary.births > 0);
        assert_eq!(sim.update_count(), 5);
    }

    #[test]
    fn empty_population_stops_immediately() {
        let config = SimulationConfig::default();
        let mut sim = sim_with(&config, 0);
        let summary = run(&mut sim, 10).unwrap();
        assert_eq!(summary.end_reason, EndReason::Extinction);
        assert_eq!(summary.updates, 0);
        assert_eq!(summary.steps, 0);
    }

    #[test]
    fn age_eviction_ends_run_in_extinction() {
        let mut config = SimulationConfig::default();
        config.scheduler.death_age = 1.0;
        // No births: the lone organism runs out its lifespan of 10 steps.
        let mut sim = Simulation::new(&config).unwrap();
        sim.inject(PopulationId::new(0), Replicator::new(10, 0, 1.0))
            .unwrap();
        let summary = run(&mut sim, 10).unwrap();
        assert_eq!(summary.end_reason, EndReason::Extinction);
        assert_eq!(summary.updates, 1);
        assert_eq!(summary.steps, 10);
        assert_eq!(summary.evictions, 1);
        assert_eq!(summary.final_live, 0);
        assert!(summary.final_total_weight.abs() < f64::EPSILON);
    }

    #[test]
    fn summary_serializes_to_json() {
        let config = SimulationConfig::default();
        let mut sim = sim_with(&config, 1);
        let summary = run(&mut sim, 1).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["end_reason"], "update_limit");
        assert_eq!(json["updates"], 1);
    }
}
