//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Which cells count as neighbors on a toroidal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// Four-connected: up, right, down, left.
    #[default]
    VonNeumann,
    /// Eight-connected: the four cardinal cells plus the diagonals.
    Moore,
}

impl Neighborhood {
    /// Number of candidate directions for this neighborhood.
    pub const fn direction_count(self) -> usize {
        match self {
            Self::VonNeumann => 4,
            Self::Moore => 8,
        }
    }
}

impl core::fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::VonNeumann => write!(f, "von_neumann"),
            Self::Moore => write!(f, "moore"),
        }
    }
}

/// What the per-round scheduling budget is proportional to.
///
/// The budget is `basis * avg_updates`. Counting slots gives every slot a
/// share of the round whether or not it is occupied; counting live agents
/// keeps the per-agent rate constant in sparse populations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetBasis {
    /// Population size in slots, occupied or not.
    #[default]
    Slots,
    /// Number of occupied slots.
    LiveAgents,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighborhood_parses_snake_case() {
        let moore: Result<Neighborhood, _> = serde_yml::from_str("moore");
        assert_eq!(moore.ok(), Some(Neighborhood::Moore));
        let von: Result<Neighborhood, _> = serde_yml::from_str("von_neumann");
        assert_eq!(von.ok(), Some(Neighborhood::VonNeumann));
    }

    #[test]
    fn direction_counts() {
        assert_eq!(Neighborhood::VonNeumann.direction_count(), 4);
        assert_eq!(Neighborhood::Moore.direction_count(), 8);
    }

    #[test]
    fn budget_basis_defaults_to_slots() {
        assert_eq!(BudgetBasis::default(), BudgetBasis::Slots);
        let live: Result<BudgetBasis, _> = serde_json::from_str("\"live_agents\"");
        assert_eq!(live.ok(), Some(BudgetBasis::LiveAgents));
    }
}
