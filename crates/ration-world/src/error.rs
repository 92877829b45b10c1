//! Error types for the `ration-world` crate.
//!
//! Every variant here is a setup-time configuration problem. Placement
//! itself never fails at runtime: a policy that cannot place returns
//! `None` so another policy may claim the population.

/// Errors that can occur while building grids and placement policies.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A grid dimension was zero.
    #[error("invalid grid dimensions {width}x{height}: both must be at least 1")]
    InvalidGrid {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// `width * height` does not fit in a slot index.
    #[error("grid {width}x{height} has more cells than can be indexed")]
    GridTooLarge {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// A placement policy was configured without any population to manage.
    #[error("placement policy `{policy}` manages no populations")]
    NoTargets {
        /// Name of the offending policy.
        policy: &'static str,
    },
}
