//! Persistence for progression, goals, tasks and the XP ledger
//!
//! The pure engine never touches SQLite. Everything it needs goes through the
//! [`ProgressionStore`] trait, which the SQLite repositories implement.
//!
//! # Usage
//!
//! ```ignore
//! let store = Store::open(&config.db_path())?;
//!
//! let current = store.progress().load_progression_state(&user)?;
//! let next = current.value.apply_xp_delta(delta, today);
//! store.progress().save_progression_state(&user, current.version, &next)?;
//! ```

mod db;
mod goals;
mod leaderboard;
mod progress;
mod tasks;
mod users;

pub use db::ProgressDb;
pub use goals::GoalRepo;
pub use leaderboard::{LeaderboardEntry, LeaderboardQuery, LeaderboardRow, rank_entries};
pub use progress::ProgressRepo;
pub use tasks::TaskRepo;
pub use users::{UserRecord, UserRepo};

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Goal, UserId};
use crate::progression::{ProgressionState, XpDelta};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Stale write for user {user_id}: expected version {expected}")]
    StaleWriteConflict { user_id: String, expected: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A value together with the version it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// What caused an XP change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XpSource {
    Task,
    Goal,
    Meal,
    Manual,
}

impl XpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Goal => "goal",
            Self::Meal => "meal",
            Self::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "task" => Some(Self::Task),
            "goal" => Some(Self::Goal),
            "meal" => Some(Self::Meal),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for XpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One applied XP change, as kept in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpEvent {
    pub delta: XpDelta,
    pub source: XpSource,
    pub source_id: Option<String>,
    pub day: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A completion-record write that commits together with a progression save.
/// See [`ProgressRepo::save_with_completion`].
#[derive(Debug, Clone, Copy)]
pub enum CompletionChange<'a> {
    /// Insert the `(day, task)` row; conflicts if it already exists
    TaskDone { day: NaiveDate, task_id: &'a str },
    /// Delete the `(day, task)` row; conflicts if it is missing
    TaskUndone { day: NaiveDate, task_id: &'a str },
    /// Store `goal`'s flag; conflicts unless the stored flag is still `previous`
    Goal { goal: &'a Goal, previous: bool },
}

/// Repository boundary for per-user progression.
///
/// `save_progression_state` must be conditional: it only succeeds when the
/// stored version still equals `expected_version`, otherwise it fails with
/// [`StoreError::StaleWriteConflict`] and the caller re-runs its whole
/// load/apply/save cycle.
pub trait ProgressionStore {
    /// Load a user's state. Unknown users load as a fresh state at version 0.
    fn load_progression_state(
        &self,
        user: &UserId,
    ) -> Result<Versioned<ProgressionState>, StoreError>;

    /// Conditionally persist `state`, returning the new version
    fn save_progression_state(
        &self,
        user: &UserId,
        expected_version: u64,
        state: &ProgressionState,
    ) -> Result<u64, StoreError>;

    /// Append to the XP ledger. Stores without a ledger ignore it.
    fn record_xp_event(&self, _user: &UserId, _event: &XpEvent) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Central handle over the database and its repositories
#[derive(Clone)]
pub struct Store {
    db: ProgressDb,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            db: ProgressDb::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            db: ProgressDb::open_in_memory()?,
        })
    }

    pub fn db(&self) -> &ProgressDb {
        &self.db
    }

    pub fn progress(&self) -> ProgressRepo {
        ProgressRepo::new(self.db.clone())
    }

    pub fn goals(&self) -> GoalRepo {
        GoalRepo::new(self.db.clone())
    }

    pub fn tasks(&self) -> TaskRepo {
        TaskRepo::new(self.db.clone())
    }

    pub fn users(&self) -> UserRepo {
        UserRepo::new(self.db.clone())
    }

    pub fn leaderboard(&self) -> LeaderboardQuery {
        LeaderboardQuery::new(self.db.clone())
    }
}
