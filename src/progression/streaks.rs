//! Streak tracking
//!
//! Streaks count consecutive calendar days with at least one XP-earning
//! event. Days are compared as calendar dates in the user's local timezone,
//! never by subtracting timestamps, so DST transitions cannot skew them.

use chrono::{Local, NaiveDate};

/// Day format used for storage and display
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// How an award affected the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// First qualifying event of the day after an active streak
    Extended(u32),
    /// Another event on a day that already counted
    Unchanged,
    /// Gap of more than one day (or first ever activity); streak restarts at 1
    Started,
}

/// Today's date in the local timezone
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// True iff `today` is the calendar day right after `last`
pub fn is_consecutive_day(last: NaiveDate, today: NaiveDate) -> bool {
    last.succ_opt() == Some(today)
}

/// Streak count after a qualifying award on `today`
pub fn advance_streak(
    last: Option<NaiveDate>,
    today: NaiveDate,
    current: u32,
) -> (u32, StreakChange) {
    match last {
        Some(last) if last == today => (current, StreakChange::Unchanged),
        Some(last) if is_consecutive_day(last, today) => {
            let count = current.saturating_add(1);
            (count, StreakChange::Extended(count))
        }
        _ => (1, StreakChange::Started),
    }
}

/// Whether a streak ending on `last` is still alive on `today`
/// (activity today or yesterday)
pub fn is_active(last: Option<NaiveDate>, today: NaiveDate) -> bool {
    match last {
        Some(last) => last == today || is_consecutive_day(last, today),
        None => false,
    }
}

/// Format a date as YYYY-MM-DD
pub fn day_string(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Parse a YYYY-MM-DD day string
pub fn parse_day(day: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(day.trim(), DAY_FORMAT).ok()
}
