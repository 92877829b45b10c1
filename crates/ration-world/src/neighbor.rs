//! Neighbor placement on a toroidal grid.
//!
//! The population is laid out row-major on a [`ToroidalGrid`]. A birth
//! lands in a uniformly chosen neighboring cell of the parent (four or
//! eight candidates depending on the [`Neighborhood`]). The population
//! starts small and grows lazily: if the chosen cell lies past the current
//! end of the slot array, empty slots are appended up to and including it.

use std::collections::BTreeSet;

use rand::{Rng, RngCore};
use ration_population::SlotArray;
use ration_types::{Neighborhood, PopulationId};
use tracing::trace;

use crate::grid::{Direction, ToroidalGrid};
use crate::placement::PlacementPolicy;

/// Cell glyph for an occupied slot.
pub const OCCUPIED_CELL: char = 'X';
/// Cell glyph for an empty slot.
pub const EMPTY_CELL: char = 'o';
/// Cell glyph for a grid cell past the end of the population.
pub const MISSING_CELL: char = '.';

/// Births are placed in a cell adjacent to the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborPlacement {
    targets: BTreeSet<PopulationId>,
    grid: ToroidalGrid,
    neighborhood: Neighborhood,
}

impl NeighborPlacement {
    /// Name used in logs and errors.
    pub const NAME: &'static str = "neighbor";

    /// Create a policy managing `targets` on `grid`.
    pub const fn new(
        targets: BTreeSet<PopulationId>,
        grid: ToroidalGrid,
        neighborhood: Neighborhood,
    ) -> Self {
        Self {
            targets,
            grid,
            neighborhood,
        }
    }

    /// The grid this policy lays populations out on.
    pub const fn grid(&self) -> &ToroidalGrid {
        &self.grid
    }

    /// The neighborhood kind used for births.
    pub const fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    /// Pick a direction uniformly from the configured neighborhood.
    fn random_direction(&self, rng: &mut dyn RngCore) -> Direction {
        let dirs = Direction::for_neighborhood(self.neighborhood);
        let pick = rng.random_range(0..dirs.len());
        dirs.get(pick).copied().unwrap_or(Direction::Up)
    }

    /// Render occupancy, one text row per grid row.
    ///
    /// Occupied slots print as [`OCCUPIED_CELL`], empty slots as
    /// [`EMPTY_CELL`], and cells beyond the population as [`MISSING_CELL`].
    pub fn render_grid(&self, population: &dyn SlotArray) -> String {
        let width = self.grid.width();
        let height = self.grid.height();
        let size = population.size();
        let mut out = String::with_capacity(width.saturating_add(1).saturating_mul(height));
        for row in 0..height {
            for col in 0..width {
                let idx = self.grid.index(col, row);
                let glyph = if idx >= size {
                    MISSING_CELL
                } else if population.is_occupied(idx) {
                    OCCUPIED_CELL
                } else {
                    EMPTY_CELL
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

/// Append empty slots until `index` exists, returning `index`.
fn grow_to_include(population: &mut dyn SlotArray, index: usize) -> usize {
    while population.size() <= index {
        population.push_empty();
    }
    index
}

impl PlacementPolicy for NeighborPlacement {
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
        let direction = self.random_direction(rng);
        let offspring = self.grid.neighbor(parent, direction);
        trace!(parent, offspring, ?direction, "Neighbor birth slot chosen");
        Some(grow_to_include(population, offspring))
    }

    fn place_inject(
        &self,
        population: &mut dyn SlotArray,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        if !self.manages(population.population_id()) {
            return None;
        }
        if population.size() == 0 {
            return Some(population.push_empty());
        }
        let pos = rng.random_range(0..self.grid.cells());
        Some(grow_to_include(population, pos))
    }

    fn render(&self, population: &dyn SlotArray) -> Option<String> {
        Some(self.render_grid(population))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ration_population::Population;

    use super::*;

    fn policy(width: usize, height: usize, neighborhood: Neighborhood) -> NeighborPlacement {
        NeighborPlacement::new(
            BTreeSet::from([PopulationId::new(0)]),
            ToroidalGrid::new(width, height).unwrap(),
            neighborhood,
        )
    }

    fn pop(size: usize) -> Population<u8> {
        Population::with_empty_slots(PopulationId::new(0), "grid", size)
    }

    #[test]
    fn von_neumann_births_from_corner_hit_wrapped_neighbors() {
        let policy = policy(3, 3, Neighborhood::VonNeumann);
        let mut rng = StdRng::seed_from_u64(21);
        let mut population = pop(9);
        let mut seen = BTreeSet::new();
        for _ in 0..400 {
            seen.insert(policy.place_birth(0, &mut population, &mut rng).unwrap());
        }
        // up -> 6, right -> 1, down -> 3, left -> 2
        assert_eq!(seen, BTreeSet::from([1, 2, 3, 6]));
    }

    #[test]
    fn moore_births_cover_all_eight_neighbors() {
        let policy = policy(4, 4, Neighborhood::Moore);
        let mut rng = StdRng::seed_from_u64(8);
        let mut population = pop(16);
        let mut seen = BTreeSet::new();
        for _ in 0..800 {
            seen.insert(policy.place_birth(5, &mut population, &mut rng).unwrap());
        }
        assert_eq!(seen, BTreeSet::from([0, 1, 2, 4, 6, 8, 9, 10]));
    }

    #[test]
    fn birth_past_end_grows_population_to_include_slot() {
        let policy = policy(3, 3, Neighborhood::VonNeumann);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let mut population = pop(1);
            let slot = policy.place_birth(0, &mut population, &mut rng).unwrap();
            assert_eq!(population.size(), slot.saturating_add(1).max(1));
        }
    }

    #[test]
    fn inject_into_empty_population_appends_first_slot() {
        let policy = policy(5, 5, Neighborhood::Moore);
        let mut rng = StdRng::seed_from_u64(0);
        let mut population = pop(0);
        assert_eq!(policy.place_inject(&mut population, &mut rng), Some(0));
        assert_eq!(population.size(), 1);
    }

    #[test]
    fn inject_stays_on_grid_and_grows_as_needed() {
        let policy = policy(5, 4, Neighborhood::VonNeumann);
        let mut rng = StdRng::seed_from_u64(17);
        let mut population = pop(1);
        for _ in 0..100 {
            let before = population.size();
            let slot = policy.place_inject(&mut population, &mut rng).unwrap();
            assert!(slot < 20);
            assert_eq!(population.size(), before.max(slot.saturating_add(1)));
        }
    }

    #[test]
    fn unmanaged_population_is_left_alone() {
        let policy = policy(3, 3, Neighborhood::VonNeumann);
        let mut rng = StdRng::seed_from_u64(0);
        let mut other: Population<u8> = Population::new(PopulationId::new(4), "other");
        assert_eq!(policy.place_birth(0, &mut other, &mut rng), None);
        assert_eq!(policy.place_inject(&mut other, &mut rng), None);
        assert_eq!(other.size(), 0);
    }

    #[test]
    fn render_marks_occupied_empty_and_missing_cells() {
        let policy = policy(3, 2, Neighborhood::VonNeumann);
        let mut population = pop(4);
        population.insert(0, 1).unwrap();
        population.insert(3, 1).unwrap();
        assert_eq!(policy.render_grid(&population), "Xoo\nX..\n");
    }
}
