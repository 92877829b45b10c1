//! The placement contract and the per-simulation policy registry.
//!
//! A placement policy answers two questions for the populations it
//! manages: where a child of the organism at `parent` goes, and where an
//! organism injected from outside goes. Policies may grow the population
//! with empty slots to make room; they never touch organisms and never
//! fire lifecycle hooks. The caller inserts the organism and notifies the
//! scheduler afterwards.

use std::collections::BTreeSet;

use rand::RngCore;
use ration_population::SlotArray;
use ration_types::{Neighborhood, PopulationId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::grid::ToroidalGrid;
use crate::neighbor::NeighborPlacement;
use crate::uniform::UniformReplacement;

/// A strategy for choosing slots for new organisms.
pub trait PlacementPolicy: core::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this policy places organisms into `population`.
    fn manages(&self, population: PopulationId) -> bool;

    /// Choose a slot for a child of the organism at `parent`.
    ///
    /// Returns `None` if the population is not managed by this policy.
    fn place_birth(
        &self,
        parent: usize,
        population: &mut dyn SlotArray,
        rng: &mut dyn RngCore,
    ) -> Option<usize>;

    /// Choose a slot for an organism injected from outside the population.
    ///
    /// Returns `None` if the population is not managed by this policy.
    fn place_inject(&self, population: &mut dyn SlotArray, rng: &mut dyn RngCore)
    -> Option<usize>;

    /// Render occupancy as text, for policies with a spatial layout.
    fn render(&self, _population: &dyn SlotArray) -> Option<String> {
        None
    }
}

/// Ordered collection of placement policies.
///
/// Lookups go through the policies in registration order and stop at the
/// first one that produces a slot.
#[derive(Debug, Default)]
pub struct PlacementRegistry {
    policies: Vec<Box<dyn PlacementPolicy>>,
}

impl PlacementRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Build a registry from configuration entries.
    ///
    /// # Errors
    ///
    /// Returns the first [`WorldError`] produced by an invalid entry.
    pub fn from_specs(specs: &[PlacementSpec]) -> Result<Self, WorldError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec.build()?);
        }
        Ok(registry)
    }

    /// Append a policy.
    pub fn register(&mut self, policy: Box<dyn PlacementPolicy>) {
        debug!(policy = policy.name(), "Placement policy registered");
        self.policies.push(policy);
    }

    /// Number of registered policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether no policy is registered.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Whether any policy manages `population`.
    pub fn manages(&self, population: PopulationId) -> bool {
        self.policies.iter().any(|p| p.manages(population))
    }

    /// Ask each policy in turn for a birth slot.
    pub fn place_birth(
        &self,
        parent: usize,
        population: &mut dyn SlotArray,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        self.policies
            .iter()
            .find_map(|policy| policy.place_birth(parent, population, rng))
    }

    /// Ask each policy in turn for an injection slot.
    pub fn place_inject(
        &self,
        population: &mut dyn SlotArray,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        self.policies
            .iter()
            .find_map(|policy| policy.place_inject(population, rng))
    }

    /// Render `population` with the first managing policy that has a layout.
    pub fn render(&self, population: &dyn SlotArray) -> Option<String> {
        let id = population.population_id();
        self.policies
            .iter()
            .filter(|policy| policy.manages(id))
            .find_map(|policy| policy.render(population))
    }
}

/// Configuration entry describing one placement policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementSpec {
    /// Births replace a random other slot; injections append.
    Uniform {
        /// Populations to manage.
        #[serde(default = "default_target")]
        target: Vec<PopulationId>,
    },
    /// Births land next to the parent on a toroidal grid.
    Neighbor {
        /// Populations to manage.
        #[serde(default = "default_target")]
        target: Vec<PopulationId>,
        /// Width of the grid the population lives on.
        #[serde(default = "default_grid_side")]
        grid_width: usize,
        /// Height of the grid the population lives on.
        #[serde(default = "default_grid_side")]
        grid_height: usize,
        /// Four- or eight-connected neighborhood.
        #[serde(default)]
        neighborhood: Neighborhood,
    },
}

impl PlacementSpec {
    /// Populations this entry manages.
    pub fn targets(&self) -> &[PopulationId] {
        match self {
            Self::Uniform { target } | Self::Neighbor { target, .. } => target,
        }
    }

    /// Construct the policy described by this entry.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoTargets`] for an empty target list, or a
    /// grid error for invalid dimensions.
    pub fn build(&self) -> Result<Box<dyn PlacementPolicy>, WorldError> {
        let targets: BTreeSet<PopulationId> = self.targets().iter().copied().collect();
        match self {
            Self::Uniform { .. } => {
                if targets.is_empty() {
                    return Err(WorldError::NoTargets {
                        policy: UniformReplacement::NAME,
                    });
                }
                Ok(Box::new(UniformReplacement::new(targets)))
            }
            Self::Neighbor {
                grid_width,
                grid_height,
                neighborhood,
                ..
            } => {
                if targets.is_empty() {
                    return Err(WorldError::NoTargets {
                        policy: NeighborPlacement::NAME,
                    });
                }
                let grid = ToroidalGrid::new(*grid_width, *grid_height)?;
                Ok(Box::new(NeighborPlacement::new(targets, grid, *neighborhood)))
            }
        }
    }
}

fn default_target() -> Vec<PopulationId> {
    vec![PopulationId::new(0)]
}

const fn default_grid_side() -> usize {
    60
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ration_population::Population;

    use super::*;

    #[test]
    fn parses_both_kinds_from_yaml() {
        let yaml = r"
- kind: uniform
  target: [0]
- kind: neighbor
  target: [1]
  grid_width: 8
  grid_height: 4
  neighborhood: moore
";
        let specs: Vec<PlacementSpec> = serde_yml::from_str(yaml).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs.get(1),
            Some(&PlacementSpec::Neighbor {
                target: vec![PopulationId::new(1)],
                grid_width: 8,
                grid_height: 4,
                neighborhood: Neighborhood::Moore,
            })
        );
    }

    #[test]
    fn neighbor_defaults_to_sixty_square_von_neumann() {
        let spec: PlacementSpec = serde_yml::from_str("kind: neighbor").unwrap();
        assert_eq!(
            spec,
            PlacementSpec::Neighbor {
                target: vec![PopulationId::new(0)],
                grid_width: 60,
                grid_height: 60,
                neighborhood: Neighborhood::VonNeumann,
            }
        );
    }

    #[test]
    fn build_rejects_bad_entries() {
        let empty = PlacementSpec::Uniform { target: Vec::new() };
        assert!(matches!(empty.build(), Err(WorldError::NoTargets { .. })));

        let flat = PlacementSpec::Neighbor {
            target: vec![PopulationId::new(0)],
            grid_width: 0,
            grid_height: 3,
            neighborhood: Neighborhood::Moore,
        };
        assert!(matches!(flat.build(), Err(WorldError::InvalidGrid { .. })));
    }

    #[test]
    fn registry_routes_to_the_managing_policy() {
        let registry = PlacementRegistry::from_specs(&[
            PlacementSpec::Uniform {
                target: vec![PopulationId::new(0)],
            },
            PlacementSpec::Neighbor {
                target: vec![PopulationId::new(1)],
                grid_width: 2,
                grid_height: 2,
                neighborhood: Neighborhood::VonNeumann,
            },
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        let mut rng = StdRng::seed_from_u64(3);

        let mut uniform_pop: Population<u8> =
            Population::with_empty_slots(PopulationId::new(0), "uniform", 5);
        assert_eq!(registry.place_inject(&mut uniform_pop, &mut rng), Some(5));
        assert!(registry.render(&uniform_pop).is_none());

        let mut grid_pop: Population<u8> = Population::new(PopulationId::new(1), "grid");
        assert_eq!(registry.place_inject(&mut grid_pop, &mut rng), Some(0));
        assert!(registry.render(&grid_pop).is_some());

        let mut stray: Population<u8> = Population::new(PopulationId::new(9), "stray");
        assert!(!registry.manages(PopulationId::new(9)));
        assert_eq!(registry.place_inject(&mut stray, &mut rng), None);
        assert_eq!(registry.place_birth(0, &mut stray, &mut rng), None);
        assert_eq!(stray.size(), 0);
    }
}
