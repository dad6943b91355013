//! Badge tiers bound to XP ranges
//!
//! Badges are cosmetic and independent of levels. A table must cover
//! `[0, ∞)` with no gaps and no overlaps; that is enforced when the table is
//! built so lookups never have to handle a miss.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::error::ProgressionError;

/// A badge covering `min_xp..=max_xp` (`max_xp = None` means unbounded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTier {
    pub name: String,
    pub min_xp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_xp: Option<u64>,
    pub color: String,
    pub icon: String,
}

impl BadgeTier {
    pub fn new(
        name: impl Into<String>,
        min_xp: u64,
        max_xp: Option<u64>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            min_xp,
            max_xp,
            color: color.into(),
            icon: icon.into(),
        }
    }

    pub fn contains(&self, xp: u64) -> bool {
        xp >= self.min_xp && self.max_xp.is_none_or(|max| xp <= max)
    }
}

const CANONICAL_BADGES: &[(&str, u64, Option<u64>, &str, &str)] = &[
    ("Bronze", 0, Some(499), "#cd7f32", "🥉"),
    ("Silver", 500, Some(1499), "#c0c0c0", "🥈"),
    ("Gold", 1500, Some(2999), "#ffd700", "🥇"),
    ("Platinum", 3000, Some(4999), "#e5e4e2", "💠"),
    ("Diamond", 5000, None, "#b9f2ff", "💎"),
];

pub static CANONICAL_BADGES_TABLE: Lazy<BadgeTable> = Lazy::new(|| {
    BadgeTable::new(BadgeTable::canonical_tiers()).expect("canonical badge table is valid")
});

/// Contiguous, ordered badge table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeTable {
    tiers: Vec<BadgeTier>,
}

impl BadgeTable {
    pub fn new(tiers: Vec<BadgeTier>) -> Result<Self, ProgressionError> {
        let Some(first) = tiers.first() else {
            return Err(ProgressionError::config("badge table is empty"));
        };
        if first.min_xp != 0 {
            return Err(ProgressionError::config(format!(
                "badge '{}' must start at 0 XP (starts at {})",
                first.name, first.min_xp
            )));
        }

        for (idx, tier) in tiers.iter().enumerate() {
            let is_last = idx + 1 == tiers.len();
            match tier.max_xp {
                Some(max) if max < tier.min_xp => {
                    return Err(ProgressionError::config(format!(
                        "badge '{}' has max_xp {} below min_xp {}",
                        tier.name, max, tier.min_xp
                    )));
                }
                None if !is_last => {
                    return Err(ProgressionError::config(format!(
                        "only the last badge may be unbounded ('{}' is not last)",
                        tier.name
                    )));
                }
                _ => {}
            }

            if let Some(next) = tiers.get(idx + 1) {
                // max_xp is Some here: the None case returned above
                let expected = tier.max_xp.and_then(|max| max.checked_add(1));
                if expected != Some(next.min_xp) {
                    return Err(ProgressionError::config(format!(
                        "badge '{}' starts at {} but '{}' ends at {:?} (gap or overlap)",
                        next.name, next.min_xp, tier.name, tier.max_xp
                    )));
                }
            }
        }

        if let Some(last) = tiers.last().filter(|t| t.max_xp.is_some()) {
            return Err(ProgressionError::config(format!(
                "last badge '{}' must be unbounded",
                last.name
            )));
        }

        Ok(Self { tiers })
    }

    pub fn canonical_tiers() -> Vec<BadgeTier> {
        CANONICAL_BADGES
            .iter()
            .map(|&(name, min, max, color, icon)| BadgeTier::new(name, min, max, color, icon))
            .collect()
    }

    pub fn tiers(&self) -> &[BadgeTier] {
        &self.tiers
    }

    /// Badge whose range contains `total_xp`
    pub fn badge_for_xp(&self, total_xp: u64) -> &BadgeTier {
        match self.tiers.iter().find(|t| t.contains(total_xp)) {
            Some(tier) => tier,
            None => {
                error!(
                    "[growquest:badges] No badge covers {} XP; table integrity is broken, falling back to '{}'",
                    total_xp, self.tiers[0].name
                );
                &self.tiers[0]
            }
        }
    }
}

impl Default for BadgeTable {
    fn default() -> Self {
        CANONICAL_BADGES_TABLE.clone()
    }
}
