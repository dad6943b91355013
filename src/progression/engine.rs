//! Progression engine - the single entry point every surface uses
//!
//! Bundles the validated level and badge tables, applies XP transitions and
//! derives the events a UI would celebrate (level ups, streaks, badges).

use chrono::NaiveDate;
use serde::Serialize;

use super::badges::{BadgeTable, BadgeTier};
use super::levels::LevelTable;
use super::state::{ProgressionState, XpDelta};
use super::streaks::StreakChange;

/// A level up event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
    pub new_title: String,
}

/// Events observable after an XP transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressionEvent {
    XpAwarded { amount: u64, reason: String },
    XpRevoked { amount: u64, reason: String },
    LevelUp(LevelUp),
    StreakExtended { count: u32 },
    StreakStarted,
    BadgeEarned { badge: String },
}

/// Result of applying a delta: the new state plus derived events
#[derive(Debug, Clone)]
pub struct ProgressionOutcome {
    pub state: ProgressionState,
    pub events: Vec<ProgressionEvent>,
}

impl ProgressionOutcome {
    pub fn level_up(&self) -> Option<&LevelUp> {
        self.events.iter().find_map(|e| match e {
            ProgressionEvent::LevelUp(level_up) => Some(level_up),
            _ => None,
        })
    }
}

/// Display snapshot of a user's progression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub total_xp: u64,
    pub level: u32,
    pub title: String,
    /// XP threshold of the current level
    pub current_level_xp: u64,
    /// XP threshold of the next level (None if max)
    pub next_level_xp: Option<u64>,
    pub xp_to_next_level: Option<u64>,
    /// Progress to next level, 0 - 100
    pub progress_percent: f64,
    pub badge: BadgeTier,
    pub streak_days: u32,
    pub best_streak: u32,
    pub daily_xp: u64,
    pub last_activity_date: Option<NaiveDate>,
}

impl PlayerStats {
    pub fn is_max_level(&self) -> bool {
        self.next_level_xp.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressionEngine {
    levels: LevelTable,
    badges: BadgeTable,
}

impl ProgressionEngine {
    pub fn new(levels: LevelTable, badges: BadgeTable) -> Self {
        Self { levels, badges }
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn badges(&self) -> &BadgeTable {
        &self.badges
    }

    pub fn level_for_xp(&self, total_xp: u64) -> u32 {
        self.levels.level_for_xp(total_xp)
    }

    pub fn progress_to_next_level(&self, total_xp: u64, level: u32) -> f64 {
        self.levels.progress_to_next_level(total_xp, level)
    }

    pub fn badge_for_xp(&self, total_xp: u64) -> &BadgeTier {
        self.badges.badge_for_xp(total_xp)
    }

    /// Build the display snapshot for `state` as seen on `today`
    pub fn player_stats(&self, state: &ProgressionState, today: NaiveDate) -> PlayerStats {
        let tier = self.levels.tier_for_xp(state.total_xp);
        let next_level_xp = self.levels.xp_for_next(tier.level);

        PlayerStats {
            total_xp: state.total_xp,
            level: tier.level,
            title: tier.title.clone(),
            current_level_xp: tier.xp_threshold,
            next_level_xp,
            xp_to_next_level: self.levels.xp_to_next_level(state.total_xp),
            progress_percent: self.levels.progress_to_next_level(state.total_xp, tier.level),
            badge: self.badges.badge_for_xp(state.total_xp).clone(),
            streak_days: state.current_streak(today),
            best_streak: state.best_streak,
            daily_xp: state.daily_xp_on(today),
            last_activity_date: state.last_activity_date,
        }
    }

    /// Apply `delta` to `state` and derive the resulting events
    pub fn apply(
        &self,
        state: &ProgressionState,
        delta: XpDelta,
        today: NaiveDate,
        reason: &str,
    ) -> ProgressionOutcome {
        let (next, streak_change) = state.transition(delta, today);
        let mut events = Vec::new();

        let applied = next.total_xp.abs_diff(state.total_xp);
        if next.total_xp > state.total_xp {
            events.push(ProgressionEvent::XpAwarded {
                amount: applied,
                reason: reason.to_string(),
            });
        } else if next.total_xp < state.total_xp {
            events.push(ProgressionEvent::XpRevoked {
                amount: applied,
                reason: reason.to_string(),
            });
        }

        match streak_change {
            Some(StreakChange::Extended(count)) => {
                events.push(ProgressionEvent::StreakExtended { count })
            }
            Some(StreakChange::Started) => events.push(ProgressionEvent::StreakStarted),
            Some(StreakChange::Unchanged) | None => {}
        }

        let old_level = self.levels.level_for_xp(state.total_xp);
        let new_tier = self.levels.tier_for_xp(next.total_xp);
        if new_tier.level > old_level {
            events.push(ProgressionEvent::LevelUp(LevelUp {
                old_level,
                new_level: new_tier.level,
                new_title: new_tier.title.clone(),
            }));
        }

        let old_badge = self.badges.badge_for_xp(state.total_xp);
        let new_badge = self.badges.badge_for_xp(next.total_xp);
        if new_badge.min_xp > old_badge.min_xp {
            events.push(ProgressionEvent::BadgeEarned {
                badge: new_badge.name.clone(),
            });
        }

        ProgressionOutcome {
            state: next,
            events,
        }
    }
}
