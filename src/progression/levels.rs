//! XP and Level system
//!
//! Defines the level table, the canonical thresholds and the XP-to-level
//! calculations shared by every surface.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::error::ProgressionError;

/// One row of a level table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTier {
    pub level: u32,
    pub xp_threshold: u64,
    pub title: String,
}

impl LevelTier {
    pub fn new(level: u32, xp_threshold: u64, title: impl Into<String>) -> Self {
        Self {
            level,
            xp_threshold,
            title: title.into(),
        }
    }
}

/// Canonical thresholds: 15 levels spanning 0..3500 XP
const CANONICAL_TIERS: &[(u32, u64, &str)] = &[
    (1, 0, "Seedling"),
    (2, 100, "Sprout"),
    (3, 250, "Sprout"),
    (4, 400, "Sapling"),
    (5, 600, "Sapling"),
    (6, 800, "Explorer"),
    (7, 1000, "Explorer"),
    (8, 1250, "Achiever"),
    (9, 1500, "Achiever"),
    (10, 1750, "Pathfinder"),
    (11, 2000, "Pathfinder"),
    (12, 2400, "Champion"),
    (13, 2800, "Champion"),
    (14, 3200, "Master"),
    (15, 3500, "Legend"),
];

/// The level table every consumer resolves levels against
pub static CANONICAL_LEVELS: Lazy<LevelTable> = Lazy::new(|| {
    LevelTable::new(LevelTable::canonical_tiers()).expect("canonical level table is valid")
});

/// Validated, ascending level table.
///
/// Invariants (checked in [`LevelTable::new`]):
/// - at least one tier, the first being level 1 at threshold 0
/// - levels are consecutive `1..=n`
/// - thresholds strictly increase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    tiers: Vec<LevelTier>,
}

impl LevelTable {
    /// Build a table, rejecting anything that would make lookups ambiguous.
    pub fn new(tiers: Vec<LevelTier>) -> Result<Self, ProgressionError> {
        let Some(first) = tiers.first() else {
            return Err(ProgressionError::config("level table is empty"));
        };
        if first.level != 1 || first.xp_threshold != 0 {
            return Err(ProgressionError::config(format!(
                "level table must start at level 1 with threshold 0 (got level {} at {})",
                first.level, first.xp_threshold
            )));
        }

        for (idx, pair) in tiers.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.level != prev.level + 1 {
                return Err(ProgressionError::config(format!(
                    "level {} at position {} does not follow level {}",
                    next.level,
                    idx + 1,
                    prev.level
                )));
            }
            if next.xp_threshold <= prev.xp_threshold {
                return Err(ProgressionError::config(format!(
                    "threshold for level {} ({}) must be greater than level {} ({})",
                    next.level, next.xp_threshold, prev.level, prev.xp_threshold
                )));
            }
        }

        Ok(Self { tiers })
    }

    /// The canonical tiers as owned rows (used for config defaults)
    pub fn canonical_tiers() -> Vec<LevelTier> {
        CANONICAL_TIERS
            .iter()
            .map(|&(level, xp, title)| LevelTier::new(level, xp, title))
            .collect()
    }

    pub fn tiers(&self) -> &[LevelTier] {
        &self.tiers
    }

    /// Get a tier by level number
    pub fn tier(&self, level: u32) -> Option<&LevelTier> {
        let idx = usize::try_from(level).ok()?.checked_sub(1)?;
        self.tiers.get(idx)
    }

    pub fn max_level(&self) -> u32 {
        self.tiers.last().map(|t| t.level).unwrap_or(1)
    }

    /// Greatest level whose threshold is at or below `total_xp`
    pub fn level_for_xp(&self, total_xp: u64) -> u32 {
        self.tier_for_xp(total_xp).level
    }

    /// Tier (level + title) reached with `total_xp`
    pub fn tier_for_xp(&self, total_xp: u64) -> &LevelTier {
        // Thresholds are sorted, so the partition point is the count of reached tiers.
        // The first threshold is 0, which guarantees at least one.
        let reached = self
            .tiers
            .partition_point(|t| t.xp_threshold <= total_xp)
            .max(1);
        &self.tiers[reached - 1]
    }

    /// XP threshold of the level after `level` (None at max level)
    pub fn xp_for_next(&self, level: u32) -> Option<u64> {
        self.tier(level.saturating_add(1)).map(|t| t.xp_threshold)
    }

    /// Progress towards the next level as a percentage in `[0, 100]`.
    ///
    /// Levels outside the table are clamped into `1..=max_level`.
    pub fn progress_to_next_level(&self, total_xp: u64, level: u32) -> f64 {
        let level = level.clamp(1, self.max_level());
        let (Some(current), Some(next)) = (self.tier(level), self.xp_for_next(level)) else {
            return 100.0;
        };

        let span = (next - current.xp_threshold) as f64;
        let gained = total_xp as f64 - current.xp_threshold as f64;
        ((gained / span) * 100.0).clamp(0.0, 100.0)
    }

    /// XP still needed to reach the next level (None at max level)
    pub fn xp_to_next_level(&self, total_xp: u64) -> Option<u64> {
        let level = self.level_for_xp(total_xp);
        self.xp_for_next(level)
            .map(|next| next.saturating_sub(total_xp))
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        CANONICAL_LEVELS.clone()
    }
}

/// XP rewards for actions that carry no user-defined value
pub struct XpRewards;

impl XpRewards {
    /// XP for logging a meal
    pub const MEAL_LOGGED: u32 = 5;
}
