//! Configuration loading and typed config structures for Ration.
//!
//! The canonical configuration lives in `ration-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader for the file, and a [`SimulationConfig::validate`]
//! pass that rejects settings the scheduler cannot run with.
//!
//! Every field has a default, so an empty document is a valid
//! configuration: one population, a uniform replacement policy, and a
//! lottery scheduler keyed on the `merit` trait.

use std::path::Path;

use ration_types::{BudgetBasis, PopulationId, names};
use ration_world::PlacementSpec;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `world.seed`.
pub const SEED_ENV_VAR: &str = "RATION_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable setup.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `ration-config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, run length).
    #[serde(default)]
    pub world: WorldConfig,

    /// Populations, in id order: entry `i` gets `PopulationId(i)`.
    #[serde(default = "default_populations")]
    pub populations: Vec<PopulationConfig>,

    /// Lottery scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Placement policies, consulted in order.
    #[serde(default = "default_placement")]
    pub placement: Vec<PlacementSpec>,

    /// Initial organisms injected by the engine binary.
    #[serde(default)]
    pub seeding: SeedingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            populations: default_populations(),
            scheduler: SchedulerConfig::default(),
            placement: default_placement(),
            seeding: SeedingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file.
    ///
    /// Applies environment overrides after parsing. Does not validate;
    /// call [`Self::validate`] before building a simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.world.apply_env_overrides()?;
        Ok(config)
    }

    /// Check cross-section consistency and numeric sanity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.populations.is_empty() {
            return Err(invalid("at least one population must be configured"));
        }
        let known = |id: PopulationId| id.as_usize() < self.populations.len();

        self.scheduler.validate()?;
        if !known(self.scheduler.population) {
            return Err(invalid(format!(
                "scheduler targets unknown population {}",
                self.scheduler.population
            )));
        }

        for spec in &self.placement {
            if let Some(id) = spec.targets().iter().copied().find(|&id| !known(id)) {
                return Err(invalid(format!(
                    "placement policy targets unknown population {id}"
                )));
            }
            spec.build().map_err(|e| invalid(e.to_string()))?;
        }

        if self.seeding.count > 0 && !known(self.seeding.population) {
            return Err(invalid(format!(
                "seeding targets unknown population {}",
                self.seeding.population
            )));
        }
        if !self.seeding.merit.is_finite() {
            return Err(invalid("seeding.merit must be finite"));
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of scheduling rounds to run.
    #[serde(default = "default_updates")]
    pub updates: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            updates: default_updates(),
        }
    }
}

impl WorldConfig {
    /// Override the seed from `RATION_SEED` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the variable is set but is not an
    /// unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            self.seed = val
                .trim()
                .parse()
                .map_err(|e| invalid(format!("{SEED_ENV_VAR}={val:?}: {e}")))?;
        }
        Ok(())
    }
}

/// One population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Name used in logs.
    #[serde(default = "default_population_name")]
    pub name: String,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            name: default_population_name(),
        }
    }
}

/// Lottery scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Population the scheduler runs.
    #[serde(default)]
    pub population: PopulationId,

    /// Trait holding the scalar merit that prices each organism.
    #[serde(rename = "trait", default = "default_merit_trait")]
    pub merit_trait: String,

    /// When set, merit is re-read from this trait just before reproduction.
    #[serde(default)]
    pub parent_merit_trait: Option<String>,

    /// Average number of steps each slot gets per round.
    #[serde(default = "default_avg_updates")]
    pub avg_updates: f64,

    /// Weight every organism gets regardless of merit.
    #[serde(default = "default_base_value")]
    pub base_value: f64,

    /// Multiplier applied to merit before adding `base_value`.
    #[serde(default = "default_merit_scale_factor")]
    pub merit_scale_factor: f64,

    /// Fill weight when the scheduler first sizes its weight map.
    #[serde(default = "default_initial_weight")]
    pub initial_weight: f64,

    /// Lifespan in genome lengths of executed instructions. Negative
    /// disables age eviction.
    #[serde(default = "default_death_age")]
    pub death_age: f64,

    /// Trait counting instructions executed.
    #[serde(default = "default_insts_trait")]
    pub insts_trait: String,

    /// Trait holding genome length.
    #[serde(default = "default_genome_length_trait")]
    pub genome_length_trait: String,

    /// Flag cleared when an organism is placed.
    #[serde(default = "default_reset_trait")]
    pub reset_trait: String,

    /// What the per-round budget is proportional to.
    #[serde(default)]
    pub budget_basis: BudgetBasis,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            population: PopulationId::default(),
            merit_trait: default_merit_trait(),
            parent_merit_trait: None,
            avg_updates: default_avg_updates(),
            base_value: default_base_value(),
            merit_scale_factor: default_merit_scale_factor(),
            initial_weight: default_initial_weight(),
            death_age: default_death_age(),
            insts_trait: default_insts_trait(),
            genome_length_trait: default_genome_length_trait(),
            reset_trait: default_reset_trait(),
            budget_basis: BudgetBasis::default(),
        }
    }
}

impl SchedulerConfig {
    /// Whether age eviction is enabled.
    pub fn age_eviction_enabled(&self) -> bool {
        self.death_age >= 0.0
    }

    /// Traits an organism must carry to be scheduled.
    ///
    /// Merit always; parent merit when configured; instruction count and
    /// genome length when age eviction is on.
    pub fn required_traits(&self) -> Vec<&str> {
        let mut required = vec![self.merit_trait.as_str()];
        if let Some(parent) = &self.parent_merit_trait {
            required.push(parent.as_str());
        }
        if self.age_eviction_enabled() {
            required.push(self.insts_trait.as_str());
            required.push(self.genome_length_trait.as_str());
        }
        required
    }

    /// Check numeric settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a non-finite value, a negative
    /// `avg_updates` or `initial_weight`, or an empty trait name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("avg_updates", self.avg_updates),
            ("base_value", self.base_value),
            ("merit_scale_factor", self.merit_scale_factor),
            ("initial_weight", self.initial_weight),
            ("death_age", self.death_age),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(format!("scheduler.{field} must be finite, got {value}")));
            }
        }
        if self.avg_updates < 0.0 {
            return Err(invalid("scheduler.avg_updates must not be negative"));
        }
        if self.initial_weight < 0.0 {
            return Err(invalid("scheduler.initial_weight must not be negative"));
        }
        if self.merit_trait.is_empty() {
            return Err(invalid("scheduler.trait must name a trait"));
        }
        if self.parent_merit_trait.as_deref() == Some("") {
            return Err(invalid("scheduler.parent_merit_trait must not be empty"));
        }
        Ok(())
    }
}

/// Initial organisms the engine binary injects before the first update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedingConfig {
    /// Population receiving the seed organisms.
    #[serde(default)]
    pub population: PopulationId,

    /// Number of organisms to inject.
    #[serde(default = "default_seed_count")]
    pub count: usize,

    /// Genome length of each seed organism.
    #[serde(default = "default_genome_length")]
    pub genome_length: u64,

    /// Steps between self-copies.
    #[serde(default = "default_copy_interval")]
    pub copy_interval: u64,

    /// Starting merit.
    #[serde(default = "default_seed_merit")]
    pub merit: f64,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            population: PopulationId::default(),
            count: default_seed_count(),
            genome_length: default_genome_length(),
            copy_interval: default_copy_interval(),
            merit: default_seed_merit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Print the occupancy grid of grid-placed populations at the end.
    #[serde(default)]
    pub print_grid: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            print_grid: false,
        }
    }
}

fn default_world_name() -> String {
    "Ration".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_updates() -> u64 {
    100
}

fn default_populations() -> Vec<PopulationConfig> {
    vec![PopulationConfig::default()]
}

fn default_population_name() -> String {
    "main".to_owned()
}

fn default_placement() -> Vec<PlacementSpec> {
    vec![PlacementSpec::Uniform {
        target: vec![PopulationId::new(0)],
    }]
}

fn default_merit_trait() -> String {
    names::MERIT.to_owned()
}

const fn default_avg_updates() -> f64 {
    30.0
}

const fn default_base_value() -> f64 {
    1.0
}

const fn default_merit_scale_factor() -> f64 {
    1.0
}

const fn default_initial_weight() -> f64 {
    1.0
}

const fn default_death_age() -> f64 {
    -1.0
}

fn default_insts_trait() -> String {
    names::INSTS_EXECUTED.to_owned()
}

fn default_genome_length_trait() -> String {
    names::GENOME_LENGTH.to_owned()
}

fn default_reset_trait() -> String {
    names::NEEDS_RESET.to_owned()
}

const fn default_seed_count() -> usize {
    1
}

const fn default_genome_length() -> u64 {
    100
}

const fn default_copy_interval() -> u64 {
    100
}

const fn default_seed_merit() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ration_types::Neighborhood;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.populations.len(), 1);
        assert_eq!(config.scheduler.merit_trait, "merit");
        assert!(!config.scheduler.age_eviction_enabled());
        assert_eq!(config.placement.len(), 1);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let parsed: SimulationConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(parsed, SimulationConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  name: grid-run
  seed: 7
  updates: 12
populations:
  - name: main
  - name: test-bench
scheduler:
  population: 0
  trait: fitness
  parent_merit_trait: parent_fitness
  avg_updates: 5
  base_value: 0
  merit_scale_factor: 2.5
  initial_weight: 0
  death_age: 20
  budget_basis: live_agents
placement:
  - kind: neighbor
    target: [0]
    grid_width: 10
    grid_height: 8
    neighborhood: moore
  - kind: uniform
    target: [1]
seeding:
  population: 0
  count: 3
  genome_length: 50
  copy_interval: 25
  merit: 2.0
logging:
  level: debug
  print_grid: true
";
        let config: SimulationConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.world.name, "grid-run");
        assert_eq!(config.world.updates, 12);
        assert_eq!(config.populations.len(), 2);
        assert_eq!(config.scheduler.merit_trait, "fitness");
        assert_eq!(
            config.scheduler.parent_merit_trait.as_deref(),
            Some("parent_fitness")
        );
        assert!((config.scheduler.merit_scale_factor - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.scheduler.budget_basis, BudgetBasis::LiveAgents);
        assert_eq!(
            config.placement.first(),
            Some(&PlacementSpec::Neighbor {
                target: vec![PopulationId::new(0)],
                grid_width: 10,
                grid_height: 8,
                neighborhood: Neighborhood::Moore,
            })
        );
        assert_eq!(config.seeding.count, 3);
        assert!(config.logging.print_grid);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_config_file_parses_and_validates() {
        let yaml = include_str!("../../../ration-config.yaml");
        let config: SimulationConfig = serde_yml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.scheduler.age_eviction_enabled());
        assert!(matches!(
            config.placement.first(),
            Some(PlacementSpec::Neighbor {
                grid_width: 60,
                grid_height: 60,
                ..
            })
        ));
    }

    #[test]
    fn required_traits_follow_enabled_features() {
        let mut scheduler = SchedulerConfig::default();
        assert_eq!(scheduler.required_traits(), vec!["merit"]);

        scheduler.death_age = 2.0;
        scheduler.parent_merit_trait = Some("parent_merit".to_owned());
        assert_eq!(
            scheduler.required_traits(),
            vec!["merit", "parent_merit", "insts_executed", "genome_length"]
        );
    }

    #[test]
    fn validate_rejects_non_finite_scheduler_settings() {
        let mut config = SimulationConfig::default();
        config.scheduler.base_value = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = SimulationConfig::default();
        config.scheduler.avg_updates = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_populations() {
        let mut config = SimulationConfig::default();
        config.scheduler.population = PopulationId::new(3);
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.placement = vec![PlacementSpec::Uniform {
            target: vec![PopulationId::new(1)],
        }];
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.populations.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_sized_grid() {
        let mut config = SimulationConfig::default();
        config.placement = vec![PlacementSpec::Neighbor {
            target: vec![PopulationId::new(0)],
            grid_width: 0,
            grid_height: 5,
            neighborhood: Neighborhood::VonNeumann,
        }];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid grid"));
    }

    #[test]
    fn invalid_yaml_is_a_yaml_error() {
        let result = SimulationConfig::parse("world: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
