//! Gamification core: XP, Levels, Badges and Streaks
//!
//! Everything in this module is pure. Persistence lives in [`crate::store`]
//! and the award workflow in [`crate::tracker`]; both call in here instead of
//! recomputing levels or streaks themselves.

mod badges;
mod engine;
mod error;
mod levels;
mod state;
pub mod streaks;

pub use badges::{BadgeTable, BadgeTier, CANONICAL_BADGES_TABLE};
pub use engine::{LevelUp, PlayerStats, ProgressionEngine, ProgressionEvent, ProgressionOutcome};
pub use error::ProgressionError;
pub use levels::{CANONICAL_LEVELS, LevelTable, LevelTier, XpRewards};
pub use state::{ProgressionState, XpDelta};
pub use streaks::{StreakChange, is_consecutive_day, local_today};
