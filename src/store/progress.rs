//! Progression rows and the XP ledger

use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use super::db::{ProgressDb, now_ms, utc_from_ms, xp_from_sql, xp_to_sql};
use super::goals::write_goal_completion;
use super::tasks::{delete_completion, insert_completion};
use super::users::ensure_user_row;
use super::{CompletionChange, ProgressionStore, StoreError, Versioned, XpEvent, XpSource};
use crate::domain::UserId;
use crate::progression::streaks::{day_string, parse_day};
use crate::progression::{ProgressionState, XpDelta};

#[derive(Clone)]
pub struct ProgressRepo {
    db: ProgressDb,
}

impl ProgressRepo {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    /// Most recent ledger entries for a user, newest first
    pub fn recent_events(&self, user: &UserId, limit: usize) -> Result<Vec<XpEvent>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT delta, source, source_id, day, created_at
               FROM xp_events WHERE user_id = ?1
               ORDER BY created_at DESC, id DESC LIMIT ?2"#,
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map((user.as_str(), limit), |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, Option<String>>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, i64>(4)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (delta, source, source_id, day, created_at) = row?;
            let source = XpSource::from_str(&source)
                .ok_or_else(|| StoreError::InvalidRecord(format!("xp source '{}'", source)))?;
            let day = parse_day(&day)
                .ok_or_else(|| StoreError::InvalidRecord(format!("ledger day '{}'", day)))?;
            events.push(XpEvent {
                delta: XpDelta::new(delta),
                source,
                source_id,
                day,
                created_at: utc_from_ms(created_at),
            });
        }
        Ok(events)
    }

    /// Save `state` together with a completion-record write, atomically.
    ///
    /// Both writes are conditional: the completion record must still be as the
    /// caller read it and the progression row must still be at
    /// `expected_version`. If either check fails nothing is written and the
    /// result is [`StoreError::StaleWriteConflict`].
    pub fn save_with_completion(
        &self,
        user: &UserId,
        expected_version: u64,
        state: &ProgressionState,
        change: CompletionChange<'_>,
    ) -> Result<u64, StoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user_row(&tx, user)?;

        let applied = match change {
            CompletionChange::TaskDone { day, task_id } => {
                insert_completion(&tx, user, day, task_id)?
            }
            CompletionChange::TaskUndone { day, task_id } => {
                delete_completion(&tx, user, day, task_id)?
            }
            CompletionChange::Goal { goal, previous } => {
                write_goal_completion(&tx, user, goal, previous)?
            }
        };
        if !applied {
            return Err(stale_write(user, expected_version));
        }

        let version = write_state(&tx, user, expected_version, state)?;
        tx.commit()?;
        Ok(version)
    }
}

fn stale_write(user: &UserId, expected_version: u64) -> StoreError {
    StoreError::StaleWriteConflict {
        user_id: user.to_string(),
        expected: expected_version,
    }
}

/// Conditionally write the progression row inside an open transaction.
/// The caller has already ensured the users row.
fn write_state(
    conn: &Connection,
    user: &UserId,
    expected_version: u64,
    state: &ProgressionState,
) -> Result<u64, StoreError> {
    let now = now_ms();
    let last_day = state.last_activity_date.map(day_string);
    let new_version = expected_version + 1;
    let total_xp = xp_to_sql(state.total_xp)?;
    let daily_xp = xp_to_sql(state.daily_xp)?;

    let written = if expected_version == 0 {
        conn.execute(
            r#"INSERT INTO progression
               (user_id, total_xp, streak_days, best_streak, last_activity_day, daily_xp,
                version, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
               ON CONFLICT(user_id) DO NOTHING"#,
            rusqlite::params![
                user.as_str(),
                total_xp,
                state.streak_days,
                state.best_streak,
                last_day,
                daily_xp,
                xp_to_sql(new_version)?,
                now,
            ],
        )?
    } else {
        conn.execute(
            r#"UPDATE progression SET
               total_xp = ?2, streak_days = ?3, best_streak = ?4, last_activity_day = ?5,
               daily_xp = ?6, version = ?7, updated_at = ?8
               WHERE user_id = ?1 AND version = ?9"#,
            rusqlite::params![
                user.as_str(),
                total_xp,
                state.streak_days,
                state.best_streak,
                last_day,
                daily_xp,
                xp_to_sql(new_version)?,
                now,
                xp_to_sql(expected_version)?,
            ],
        )?
    };

    if written == 0 {
        return Err(stale_write(user, expected_version));
    }
    Ok(new_version)
}

impl ProgressionStore for ProgressRepo {
    fn load_progression_state(
        &self,
        user: &UserId,
    ) -> Result<Versioned<ProgressionState>, StoreError> {
        let conn = self.db.conn();
        let row = conn
            .query_row(
                r#"SELECT total_xp, streak_days, best_streak, last_activity_day, daily_xp, version
                   FROM progression WHERE user_id = ?1"#,
                [user.as_str()],
                |r| {
                    Ok((
                        r.get::<_, i64>(0)?,
                        r.get::<_, u32>(1)?,
                        r.get::<_, u32>(2)?,
                        r.get::<_, Option<String>>(3)?,
                        r.get::<_, i64>(4)?,
                        r.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((total_xp, streak_days, best_streak, last_day, daily_xp, version)) = row else {
            return Ok(Versioned {
                version: 0,
                value: ProgressionState::default(),
            });
        };

        let last_activity_date = match last_day {
            Some(day) => Some(parse_day(&day).ok_or_else(|| {
                StoreError::InvalidRecord(format!("last_activity_day '{}' for {}", day, user))
            })?),
            None => None,
        };

        Ok(Versioned {
            version: xp_from_sql(version),
            value: ProgressionState {
                total_xp: xp_from_sql(total_xp),
                streak_days,
                best_streak,
                last_activity_date,
                daily_xp: xp_from_sql(daily_xp),
            },
        })
    }

    fn save_progression_state(
        &self,
        user: &UserId,
        expected_version: u64,
        state: &ProgressionState,
    ) -> Result<u64, StoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user_row(&tx, user)?;
        // Dropping the transaction on a conflict rolls back the user insert as well
        let version = write_state(&tx, user, expected_version, state)?;
        tx.commit()?;
        Ok(version)
    }

    fn record_xp_event(&self, user: &UserId, event: &XpEvent) -> Result<(), StoreError> {
        let conn = self.db.conn();
        conn.execute(
            r#"INSERT INTO xp_events (user_id, delta, source, source_id, day, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            rusqlite::params![
                user.as_str(),
                event.delta.amount(),
                event.source.as_str(),
                event.source_id,
                day_string(event.day),
                event.created_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }
}
