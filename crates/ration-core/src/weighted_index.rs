//! Dynamic weighted sampling over slot indices.
//!
//! [`WeightedIndex`] keeps one non-negative weight per slot and answers
//! "which slot owns position `x` on the cumulative weight line" in
//! O(log n). Raw weights live in a plain array next to a Fenwick tree of
//! partial sums. Point updates touch O(log n) tree nodes and adjust the
//! running total incrementally; a full rebuild from the raw array
//! ([`WeightedIndex::refresh`]) clears whatever floating-point drift the
//! incremental updates accumulated.
//!
//! A rebuild can be requested lazily with [`WeightedIndex::defer_refresh`].
//! Nothing is recomputed until the next read of the total or the next
//! sample, so a burst of deaths costs one rebuild, not one per death.

/// Errors that can occur when mutating or sampling a [`WeightedIndex`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightedIndexError {
    /// `resize` was asked to drop entries; slots are never removed.
    #[error("cannot resize weight map from {current} down to {requested} entries")]
    Shrink {
        /// Current number of entries.
        current: usize,
        /// Requested number of entries.
        requested: usize,
    },

    /// A slot index was at or beyond the number of entries.
    #[error("weight slot {slot} out of range (len {len})")]
    SlotOutOfRange {
        /// The requested slot.
        slot: usize,
        /// Number of entries at the time of the call.
        len: usize,
    },

    /// A weight was negative, NaN, or infinite.
    #[error("invalid weight {weight}: weights must be finite and non-negative")]
    InvalidWeight {
        /// The rejected weight.
        weight: f64,
    },

    /// A sample point fell outside `[0, total)`, or the total was zero.
    #[error("sample {sample} outside [0, {total})")]
    SampleOutOfRange {
        /// The requested sample point.
        sample: f64,
        /// The total weight at the time of the call.
        total: f64,
    },
}

/// Slot weights with O(log n) update and proportional lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedIndex {
    /// Raw weight per slot.
    weights: Vec<f64>,
    /// Fenwick nodes. Node `k` (1-based, stored at `tree[k - 1]`) holds the
    /// sum of the `lowbit(k)` weights ending at slot `k - 1`.
    tree: Vec<f64>,
    /// Running sum of all weights.
    total: f64,
    /// A rebuild is pending; `tree` and `total` may be out of date.
    stale: bool,
}

/// Lowest set bit of `k`.
const fn lowbit(k: usize) -> usize {
    k & k.wrapping_neg()
}

fn check_weight(weight: f64) -> Result<(), WeightedIndexError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(WeightedIndexError::InvalidWeight { weight })
    }
}

impl WeightedIndex {
    /// Create an empty index.
    pub const fn new() -> Self {
        Self {
            weights: Vec::new(),
            tree: Vec::new(),
            total: 0.0,
            stale: false,
        }
    }

    /// Build an index over existing weights.
    ///
    /// # Errors
    ///
    /// Returns [`WeightedIndexError::InvalidWeight`] for the first weight
    /// that is negative or non-finite.
    pub fn from_weights(weights: Vec<f64>) -> Result<Self, WeightedIndexError> {
        for &weight in &weights {
            check_weight(weight)?;
        }
        let mut index = Self {
            weights,
            tree: Vec::new(),
            total: 0.0,
            stale: false,
        };
        index.refresh();
        Ok(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Whether a deferred rebuild is pending.
    pub const fn needs_refresh(&self) -> bool {
        self.stale
    }

    /// Raw stored weight of `slot`.
    pub fn weight(&self, slot: usize) -> Option<f64> {
        self.weights.get(slot).copied()
    }

    /// All raw weights in slot order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Grow to `len` entries, filling new ones with `fill`.
    ///
    /// Growing by a few entries costs O(log n) each; existing entries are
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WeightedIndexError::Shrink`] if `len` is smaller than the
    /// current length, or [`WeightedIndexError::InvalidWeight`] for a bad
    /// fill value.
    pub fn resize(&mut self, len: usize, fill: f64) -> Result<(), WeightedIndexError> {
        let current = self.weights.len();
        if len < current {
            return Err(WeightedIndexError::Shrink {
                current,
                requested: len,
            });
        }
        check_weight(fill)?;
        if self.stale {
            self.weights.resize(len, fill);
            return Ok(());
        }
        self.weights.reserve(len.saturating_sub(current));
        self.tree.reserve(len.saturating_sub(current));
        while self.weights.len() < len {
            self.push_node(fill);
        }
        Ok(())
    }

    /// Set the weight of `slot`.
    ///
    /// Lowering a weight by at least the mass that remains afterwards marks
    /// the index for a rebuild, as [`WeightedIndex::defer_refresh`] does.
    ///
    /// # Errors
    ///
    /// Returns [`WeightedIndexError::InvalidWeight`] if `weight` is negative
    /// or non-finite, or [`WeightedIndexError::SlotOutOfRange`] if `slot`
    /// does not exist.
    pub fn adjust(&mut self, slot: usize, weight: f64) -> Result<(), WeightedIndexError> {
        check_weight(weight)?;
        let len = self.weights.len();
        let Some(stored) = self.weights.get_mut(slot) else {
            return Err(WeightedIndexError::SlotOutOfRange { slot, len });
        };
        let delta = weight - *stored;
        *stored = weight;
        if self.stale {
            return Ok(());
        }
        self.add_to_tree(slot, delta);
        self.total += delta;
        if delta < 0.0 && self.total <= -delta {
            // Removing at least half the mass leaves the running sums
            // dominated by cancellation error. Rebuild before the next read.
            self.stale = true;
        }
        Ok(())
    }

    /// Exchange the weights of two slots.
    ///
    /// # Errors
    ///
    /// Returns [`WeightedIndexError::SlotOutOfRange`] if either slot does
    /// not exist.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), WeightedIndexError> {
        let len = self.weights.len();
        let wa = self
            .weight(a)
            .ok_or(WeightedIndexError::SlotOutOfRange { slot: a, len })?;
        let wb = self
            .weight(b)
            .ok_or(WeightedIndexError::SlotOutOfRange { slot: b, len })?;
        if a == b {
            return Ok(());
        }
        self.adjust(a, wb)?;
        self.adjust(b, wa)
    }

    /// Mark the partial sums for a full rebuild before the next read.
    pub const fn defer_refresh(&mut self) {
        self.stale = true;
    }

    /// Rebuild the partial sums and the total from the raw weights now.
    pub fn refresh(&mut self) {
        let n = self.weights.len();
        self.tree.clear();
        self.tree.extend_from_slice(&self.weights);
        for k in 1..=n {
            let parent = k.saturating_add(lowbit(k));
            if parent > n {
                continue;
            }
            let child = self.tree.get(k.saturating_sub(1)).copied().unwrap_or(0.0);
            if let Some(node) = self.tree.get_mut(parent.saturating_sub(1)) {
                *node += child;
            }
        }
        self.total = self.weights.iter().sum();
        self.stale = false;
    }

    /// Sum of all weights, performing a pending rebuild first.
    pub fn total_weight(&mut self) -> f64 {
        self.resolve();
        self.total
    }

    /// The slot owning position `sample` on the cumulative weight line.
    ///
    /// For `0 <= sample < total` this is the unique slot `i` with
    /// `sum(weights[..i]) <= sample < sum(weights[..=i])`. Slots of weight
    /// zero own an empty interval and are never returned.
    ///
    /// # Errors
    ///
    /// Returns [`WeightedIndexError::SampleOutOfRange`] if `sample` lies
    /// outside `[0, total)` or the total is zero. Callers are expected to
    /// draw inside that range, so debug builds also assert on it.
    pub fn index(&mut self, sample: f64) -> Result<usize, WeightedIndexError> {
        self.resolve();
        let total = self.total;
        let in_range = total > 0.0 && (0.0..total).contains(&sample);
        debug_assert!(in_range, "sample {sample} outside [0, {total})");
        if !in_range {
            return Err(WeightedIndexError::SampleOutOfRange { sample, total });
        }
        if let Some(slot) = self.descend(sample) {
            return Ok(slot);
        }

        // Incremental drift pushed the sample past the last positive weight.
        // After the rebuild the sample may exceed the exact total; callers
        // then draw again against `total_weight`.
        self.refresh();
        let total = self.total;
        if sample < total
            && let Some(slot) = self.descend(sample)
        {
            return Ok(slot);
        }
        Err(WeightedIndexError::SampleOutOfRange { sample, total })
    }

    /// Rebuild if a refresh was deferred.
    fn resolve(&mut self) {
        if self.stale {
            self.refresh();
        }
    }

    /// Append one entry, computing its Fenwick node from its children.
    fn push_node(&mut self, weight: f64) {
        self.weights.push(weight);
        let k = self.weights.len();
        let floor = k.saturating_sub(lowbit(k));
        let mut node = weight;
        let mut child = k.saturating_sub(1);
        while child > floor {
            node += self.tree.get(child.saturating_sub(1)).copied().unwrap_or(0.0);
            child = child.saturating_sub(lowbit(child));
        }
        self.tree.push(node);
        self.total += weight;
    }

    /// Add `delta` to every node covering `slot`.
    fn add_to_tree(&mut self, slot: usize, delta: f64) {
        let n = self.tree.len();
        let mut k = slot.saturating_add(1);
        while k <= n {
            if let Some(node) = self.tree.get_mut(k.saturating_sub(1)) {
                *node += delta;
            }
            k = k.saturating_add(lowbit(k));
        }
    }

    /// Walk the tree for the first slot whose cumulative sum exceeds `sample`.
    fn descend(&self, sample: f64) -> Option<usize> {
        let n = self.tree.len();
        if n == 0 {
            return None;
        }
        let mut pos = 0_usize;
        let mut remaining = sample;
        let mut step = 1_usize.checked_shl(n.ilog2()).unwrap_or(0);
        while step > 0 {
            let next = pos.saturating_add(step);
            if next <= n
                && let Some(&node) = self.tree.get(next.saturating_sub(1))
                && node <= remaining
            {
                pos = next;
                remaining -= node;
            }
            step >>= 1;
        }
        // `pos` leading slots sum to at most `sample`; the next one owns it.
        match self.weights.get(pos) {
            Some(&weight) if weight > 0.0 => Some(pos),
            _ => None,
        }
    }
}
