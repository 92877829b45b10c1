//! Type-safe identifier wrappers.
//!
//! Populations are addressed by a small dense index rather than a UUID:
//! a simulation holds a handful of populations created once at setup, and
//! configuration files refer to them by position.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a dense `u32` index with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from a raw index.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the raw index value.
            pub const fn into_inner(self) -> u32 {
                self.0
            }

            /// Return the raw index as a `usize` for container lookups.
            pub fn as_usize(self) -> usize {
                usize::try_from(self.0).unwrap_or(usize::MAX)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier for a population (an indexed slot array) in a simulation.
    PopulationId
}
