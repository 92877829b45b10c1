//! Growable slot arrays of organisms.
//!
//! A [`Population`] is an ordered array of slots, each either empty or
//! holding one organism. The slot count (`size`) only ever grows through
//! [`Population::push_empty`]; clearing a slot leaves a hole rather than
//! compacting the array, so slot indices stay stable for the weight map
//! and for grid coordinates.
//!
//! Placement policies only need to look at occupancy and grow the array,
//! never to touch organisms, so they consume the object-safe [`SlotArray`]
//! view instead of the generic type.

use ration_types::PopulationId;

use crate::error::PopulationError;

/// Occupancy view of a population used by placement policies.
pub trait SlotArray {
    /// Identifier of the underlying population.
    fn population_id(&self) -> PopulationId;

    /// Number of slots, occupied or not.
    fn size(&self) -> usize;

    /// Number of occupied slots.
    fn live_count(&self) -> usize;

    /// Whether `slot` exists and holds an organism.
    fn is_occupied(&self, slot: usize) -> bool;

    /// Append one empty slot and return its index.
    fn push_empty(&mut self) -> usize;
}

/// An indexed array of optional organisms.
#[derive(Debug, Clone)]
pub struct Population<O> {
    /// Identifier within the owning simulation.
    id: PopulationId,
    /// Human-readable name from configuration.
    name: String,
    /// The slots. `None` marks a hole.
    slots: Vec<Option<O>>,
    /// Number of `Some` entries in `slots`.
    live: usize,
}

impl<O> Population<O> {
    /// Create an empty population with no slots.
    pub fn new(id: PopulationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slots: Vec::new(),
            live: 0,
        }
    }

    /// Create a population pre-sized with `size` empty slots.
    pub fn with_empty_slots(id: PopulationId, name: impl Into<String>, size: usize) -> Self {
        let mut slots = Vec::with_capacity(size);
        slots.resize_with(size, || None);
        Self {
            id,
            name: name.into(),
            slots,
            live: 0,
        }
    }

    /// Return the population identifier.
    pub const fn id(&self) -> PopulationId {
        self.id
    }

    /// Return the configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of slots, occupied or not.
    pub const fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub const fn live_count(&self) -> usize {
        self.live
    }

    /// Whether no slot is occupied.
    pub const fn is_extinct(&self) -> bool {
        self.live == 0
    }

    /// Whether `slot` exists and holds an organism.
    pub fn is_occupied(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(Some(_)))
    }

    /// Borrow the organism at `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<&O> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Mutably borrow the organism at `slot`, if any.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut O> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Append one empty slot and return its index.
    pub fn push_empty(&mut self) -> usize {
        self.slots.push(None);
        self.slots.len().saturating_sub(1)
    }

    /// Place `organism` in `slot`, returning the previous occupant.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::SlotOutOfRange`] if `slot >= size`.
    pub fn insert(&mut self, slot: usize, organism: O) -> Result<Option<O>, PopulationError> {
        let size = self.slots.len();
        let id = self.id;
        let entry = self.slots.get_mut(slot).ok_or(PopulationError::SlotOutOfRange {
            population: id,
            slot,
            size,
        })?;
        let previous = entry.replace(organism);
        if previous.is_none() {
            self.live = self
                .live
                .checked_add(1)
                .ok_or(PopulationError::LiveCountOutOfSync(id))?;
        }
        Ok(previous)
    }

    /// Empty `slot`, returning the organism that occupied it.
    ///
    /// Clearing an already empty slot is a no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::SlotOutOfRange`] if `slot >= size`.
    pub fn clear(&mut self, slot: usize) -> Result<Option<O>, PopulationError> {
        let size = self.slots.len();
        let id = self.id;
        let entry = self.slots.get_mut(slot).ok_or(PopulationError::SlotOutOfRange {
            population: id,
            slot,
            size,
        })?;
        let previous = entry.take();
        if previous.is_some() {
            self.live = self
                .live
                .checked_sub(1)
                .ok_or(PopulationError::LiveCountOutOfSync(id))?;
        }
        Ok(previous)
    }

    /// Exchange the contents of two slots.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::SlotOutOfRange`] if either slot is missing.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), PopulationError> {
        let size = self.slots.len();
        for slot in [a, b] {
            if slot >= size {
                return Err(PopulationError::SlotOutOfRange {
                    population: self.id,
                    slot,
                    size,
                });
            }
        }
        self.slots.swap(a, b);
        Ok(())
    }

    /// Iterate over occupied slots as `(slot, organism)` pairs.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &O)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|org| (slot, org)))
    }
}

impl<O> SlotArray for Population<O> {
    fn population_id(&self) -> PopulationId {
        self.id
    }

    fn size(&self) -> usize {
        Self::size(self)
    }

    fn live_count(&self) -> usize {
        Self::live_count(self)
    }

    fn is_occupied(&self, slot: usize) -> bool {
        Self::is_occupied(self, slot)
    }

    fn push_empty(&mut self) -> usize {
        Self::push_empty(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pop() -> Population<u32> {
        Population::with_empty_slots(PopulationId::new(0), "main", 3)
    }

    #[test]
    fn starts_with_holes() {
        let p = pop();
        assert_eq!(p.size(), 3);
        assert_eq!(p.live_count(), 0);
        assert!(p.is_extinct());
        assert!(!p.is_occupied(0));
        assert!(!p.is_occupied(5));
    }

    #[test]
    fn insert_and_clear_track_live_count() {
        let mut p = pop();
        assert!(p.insert(1, 10).unwrap().is_none());
        assert_eq!(p.live_count(), 1);

        // Replacing an occupant keeps the count.
        assert_eq!(p.insert(1, 11).unwrap(), Some(10));
        assert_eq!(p.live_count(), 1);

        assert_eq!(p.clear(1).unwrap(), Some(11));
        assert_eq!(p.live_count(), 0);

        // Clearing a hole is a no-op.
        assert!(p.clear(1).unwrap().is_none());
        assert_eq!(p.live_count(), 0);
    }

    #[test]
    fn out_of_range_slots_are_rejected() {
        let mut p = pop();
        assert!(matches!(
            p.insert(3, 1),
            Err(PopulationError::SlotOutOfRange { slot: 3, size: 3, .. })
        ));
        assert!(p.clear(9).is_err());
        assert!(p.swap(0, 3).is_err());
    }

    #[test]
    fn push_empty_grows_by_one() {
        let mut p = pop();
        assert_eq!(p.push_empty(), 3);
        assert_eq!(p.size(), 4);
        assert_eq!(p.live_count(), 0);
    }

    #[test]
    fn swap_moves_organisms() {
        let mut p = pop();
        p.insert(0, 7).unwrap();
        p.swap(0, 2).unwrap();
        assert!(p.get(0).is_none());
        assert_eq!(p.get(2), Some(&7));
        assert_eq!(p.live_count(), 1);
    }

    #[test]
    fn occupied_skips_holes() {
        let mut p = pop();
        p.insert(0, 1).unwrap();
        p.insert(2, 3).unwrap();
        let seen: Vec<(usize, u32)> = p.occupied().map(|(i, o)| (i, *o)).collect();
        assert_eq!(seen, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn slot_array_view_matches() {
        let mut p = pop();
        p.insert(1, 4).unwrap();
        let view: &mut dyn SlotArray = &mut p;
        assert_eq!(view.size(), 3);
        assert_eq!(view.live_count(), 1);
        assert!(view.is_occupied(1));
        assert_eq!(view.push_empty(), 3);
        assert_eq!(view.population_id(), PopulationId::new(0));
    }
}
