//! Organism trait values and the default trait names.
//!
//! Organisms expose their state to the scheduler as named scalar traits.
//! The scheduler never interprets a trait beyond reading it as a number or
//! a flag, so a single small value enum covers every trait it touches.

use serde::{Deserialize, Serialize};

/// A single named value stored on an organism.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    /// Boolean flag (for example "needs reset").
    Bool(bool),
    /// Unsigned counter (for example instructions executed).
    Int(u64),
    /// Real-valued score (for example merit).
    Float(f64),
}

impl TraitValue {
    /// Read the value as a float. Flags map to `0.0` / `1.0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Bool(flag) => {
                if flag {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Int(n) => n as f64,
            Self::Float(x) => x,
        }
    }

    /// Read the value as an unsigned counter.
    ///
    /// Floats are truncated toward zero; negative and non-finite floats
    /// read as `0`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_u64(self) -> u64 {
        match self {
            Self::Bool(flag) => u64::from(flag),
            Self::Int(n) => n,
            Self::Float(x) => {
                if x.is_finite() && x > 0.0 {
                    x as u64
                } else {
                    0
                }
            }
        }
    }

    /// Read the value as a flag. Numbers are `true` when non-zero.
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(flag) => flag,
            Self::Int(n) => n != 0,
            Self::Float(x) => x != 0.0,
        }
    }
}

impl From<f64> for TraitValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<u64> for TraitValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for TraitValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Default trait names used when configuration does not override them.
pub mod names {
    /// Fitness-like value that drives scheduling weight.
    pub const MERIT: &str = "merit";
    /// Merit to assign a parent right after it reproduces.
    pub const PARENT_MERIT: &str = "parent_merit";
    /// Counter of single steps the organism has executed.
    pub const INSTS_EXECUTED: &str = "insts_executed";
    /// Genome length, used to scale the death-by-age threshold.
    pub const GENOME_LENGTH: &str = "genome_length";
    /// Flag cleared when the organism is placed.
    pub const NEEDS_RESET: &str = "needs_reset";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_between_kinds() {
        assert!((TraitValue::Int(20).as_f64() - 20.0).abs() < f64::EPSILON);
        assert_eq!(TraitValue::Float(19.9).as_u64(), 19);
        assert_eq!(TraitValue::Float(-3.0).as_u64(), 0);
        assert_eq!(TraitValue::Float(f64::NAN).as_u64(), 0);
        assert!(TraitValue::Int(1).as_bool());
        assert!(!TraitValue::Float(0.0).as_bool());
        assert!((TraitValue::Bool(true).as_f64() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn untagged_deserialization_picks_narrowest_kind() {
        let flag: Result<TraitValue, _> = serde_json::from_str("true");
        assert_eq!(flag.ok(), Some(TraitValue::Bool(true)));
        let count: Result<TraitValue, _> = serde_json::from_str("12");
        assert_eq!(count.ok(), Some(TraitValue::Int(12)));
        let merit: Result<TraitValue, _> = serde_json::from_str("2.5");
        assert_eq!(merit.ok(), Some(TraitValue::Float(2.5)));
    }
}
