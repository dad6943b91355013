//! Per-user progression state and the pure XP transition

use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::ProgressionError;
use super::levels::LevelTable;
use super::streaks::{StreakChange, advance_streak, is_active};

/// Signed XP change: positive awards, negative revokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct XpDelta(i64);

impl XpDelta {
    pub const ZERO: XpDelta = XpDelta(0);

    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    pub fn award(xp: u32) -> Self {
        Self(i64::from(xp))
    }

    pub fn revoke(xp: u32) -> Self {
        Self(-i64::from(xp))
    }

    /// `+xp` when something became completed, `-xp` when it was un-completed
    pub fn for_completion(xp: u32, completed: bool) -> Self {
        if completed {
            Self::award(xp)
        } else {
            Self::revoke(xp)
        }
    }

    pub fn amount(self) -> i64 {
        self.0
    }

    pub fn is_award(self) -> bool {
        self.0 > 0
    }
}

impl Neg for XpDelta {
    type Output = XpDelta;

    fn neg(self) -> Self::Output {
        XpDelta(self.0.saturating_neg())
    }
}

impl fmt::Display for XpDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

impl TryFrom<f64> for XpDelta {
    type Error = ProgressionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(ProgressionError::InvalidDelta(format!("{} is not finite", value)));
        }
        if value.fract() != 0.0 {
            return Err(ProgressionError::InvalidDelta(format!(
                "{} is not a whole number",
                value
            )));
        }
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if value < i64::MIN as f64 || value >= i64::MAX as f64 {
            return Err(ProgressionError::InvalidDelta(format!("{} is out of range", value)));
        }
        Ok(Self(value as i64))
    }
}

impl FromStr for XpDelta {
    type Err = ProgressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(amount) = s.parse::<i64>() {
            return Ok(Self(amount));
        }
        match s.parse::<f64>() {
            Ok(value) => Self::try_from(value),
            Err(_) => Err(ProgressionError::InvalidDelta(format!("'{}' is not a number", s))),
        }
    }
}

/// Accumulated progression for one user.
///
/// The level is not stored here; it is always derived from `total_xp`
/// through the shared [`LevelTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub total_xp: u64,
    pub streak_days: u32,
    #[serde(default)]
    pub best_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    /// XP earned on `last_activity_date`
    pub daily_xp: u64,
}

impl ProgressionState {
    pub fn level(&self, table: &LevelTable) -> u32 {
        table.level_for_xp(self.total_xp)
    }

    /// Streak as seen on `today`: 0 once a full day has been missed
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        if is_active(self.last_activity_date, today) {
            self.streak_days
        } else {
            0
        }
    }

    /// XP earned on `today` (0 if the last activity was on another day)
    pub fn daily_xp_on(&self, today: NaiveDate) -> u64 {
        if self.last_activity_date == Some(today) {
            self.daily_xp
        } else {
            0
        }
    }

    /// Apply an XP change that happened on `today`, returning the new state.
    ///
    /// - total XP is clamped at 0
    /// - only awards touch the streak and the last activity date
    /// - daily XP restarts whenever `today` is not the last activity day
    pub fn apply_xp_delta(&self, delta: XpDelta, today: NaiveDate) -> Self {
        self.transition(delta, today).0
    }

    pub(crate) fn transition(
        &self,
        delta: XpDelta,
        today: NaiveDate,
    ) -> (Self, Option<StreakChange>) {
        let amount = delta.amount();
        let total_xp = add_signed(self.total_xp, amount);

        let (streak_days, last_activity_date, change) = if delta.is_award() {
            let (streak, change) = advance_streak(self.last_activity_date, today, self.streak_days);
            (streak, Some(today), Some(change))
        } else {
            (self.streak_days, self.last_activity_date, None)
        };

        let daily_xp = if self.last_activity_date != Some(today) {
            add_signed(0, amount)
        } else {
            add_signed(self.daily_xp, amount)
        };

        let next = Self {
            total_xp,
            streak_days,
            best_streak: self.best_streak.max(streak_days),
            last_activity_date,
            daily_xp,
        };
        (next, change)
    }
}

fn add_signed(base: u64, delta: i64) -> u64 {
    if delta >= 0 {
        base.saturating_add(delta.unsigned_abs())
    } else {
        base.saturating_sub(delta.unsigned_abs())
    }
}
