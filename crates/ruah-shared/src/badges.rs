//! Streak badge ladder.
//!
//! A participant's badge is derived from the streak counter alone; there is
//! no stored badge state anywhere.

use serde::{Deserialize, Serialize};

use crate::constants::{BLAZE_MIN_STREAK, EMBER_MIN_STREAK, TORCH_MIN_STREAK};

/// Badge tiers, lowest to highest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BadgeTier {
    Spark,
    Ember,
    Torch,
    Blaze,
}

impl BadgeTier {
    /// Map a streak length to its tier.
    pub fn for_streak(days: u32) -> Self {
        if days >= BLAZE_MIN_STREAK {
            Self::Blaze
        } else if days >= TORCH_MIN_STREAK {
            Self::Torch
        } else if days >= EMBER_MIN_STREAK {
            Self::Ember
        } else {
            Self::Spark
        }
    }

    /// Display label shown in the app (Portuguese, as in the group).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spark => "Faísca",
            Self::Ember => "Brasa",
            Self::Torch => "Tocha",
            Self::Blaze => "Labareda",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(BadgeTier::for_streak(0), BadgeTier::Spark);
        assert_eq!(BadgeTier::for_streak(3), BadgeTier::Spark);
        assert_eq!(BadgeTier::for_streak(4), BadgeTier::Ember);
        assert_eq!(BadgeTier::for_streak(10), BadgeTier::Ember);
        assert_eq!(BadgeTier::for_streak(11), BadgeTier::Torch);
        assert_eq!(BadgeTier::for_streak(20), BadgeTier::Torch);
        assert_eq!(BadgeTier::for_streak(21), BadgeTier::Blaze);
        assert_eq!(BadgeTier::for_streak(365), BadgeTier::Blaze);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(BadgeTier::Spark < BadgeTier::Ember);
        assert!(BadgeTier::Torch < BadgeTier::Blaze);
    }
}
