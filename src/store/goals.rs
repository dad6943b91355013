use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use super::StoreError;
use super::db::{ProgressDb, utc_from_ms};
use super::users::ensure_user_row;
use crate::domain::{Category, Goal, UserId};

#[derive(Clone)]
pub struct GoalRepo {
    db: ProgressDb,
}

type GoalRow = (String, String, String, u32, bool, i64, Option<i64>);

impl GoalRepo {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    pub fn insert(&self, user: &UserId, goal: &Goal) -> Result<(), StoreError> {
        let conn = self.db.conn();
        ensure_user_row(&conn, user)?;
        conn.execute(
            r#"INSERT INTO goals (id, user_id, text, category, xp_value, completed, created_at, completed_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            rusqlite::params![
                goal.id.to_string(),
                user.as_str(),
                goal.text,
                goal.category.as_str(),
                goal.xp_value,
                goal.completed,
                goal.created_at.timestamp_millis(),
                goal.completed_at.map(|t| t.timestamp_millis()),
            ],
        )?;
        Ok(())
    }

    /// All goals of a user, oldest first
    pub fn list(&self, user: &UserId) -> Result<Vec<Goal>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT id, text, category, xp_value, completed, created_at, completed_at
               FROM goals WHERE user_id = ?1 ORDER BY created_at, id"#,
        )?;
        let rows = stmt.query_map([user.as_str()], read_row)?;

        let mut goals = Vec::new();
        for row in rows {
            goals.push(goal_from_row(row?)?);
        }
        Ok(goals)
    }

    pub fn get(&self, user: &UserId, id: Uuid) -> Result<Option<Goal>, StoreError> {
        let conn = self.db.conn();
        let row = conn
            .query_row(
                r#"SELECT id, text, category, xp_value, completed, created_at, completed_at
                   FROM goals WHERE user_id = ?1 AND id = ?2"#,
                (user.as_str(), id.to_string()),
                read_row,
            )
            .optional()?;
        row.map(goal_from_row).transpose()
    }

    /// Returns false if the goal did not exist
    pub fn delete(&self, user: &UserId, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.db.conn();
        let deleted = conn.execute(
            "DELETE FROM goals WHERE user_id = ?1 AND id = ?2",
            (user.as_str(), id.to_string()),
        )?;
        Ok(deleted == 1)
    }
}

/// Persist a completion change only if the stored flag still equals
/// `previous`. Returns false when another writer got there first.
pub(super) fn write_goal_completion(
    conn: &Connection,
    user: &UserId,
    goal: &Goal,
    previous: bool,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        r#"UPDATE goals SET completed = ?1, completed_at = ?2
           WHERE user_id = ?3 AND id = ?4 AND completed = ?5"#,
        rusqlite::params![
            goal.completed,
            goal.completed_at.map(|t| t.timestamp_millis()),
            user.as_str(),
            goal.id.to_string(),
            previous,
        ],
    )?;
    Ok(changed == 1)
}

fn read_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<GoalRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

fn goal_from_row(row: GoalRow) -> Result<Goal, StoreError> {
    let (id, text, category, xp_value, completed, created_at, completed_at) = row;
    let id = Uuid::parse_str(&id)
        .map_err(|e| StoreError::InvalidRecord(format!("goal id '{}': {}", id, e)))?;
    let category: Category = category
        .parse()
        .map_err(|e| StoreError::InvalidRecord(format!("goal {}: {}", id, e)))?;

    Ok(Goal {
        id,
        text,
        category,
        xp_value,
        completed,
        created_at: utc_from_ms(created_at),
        completed_at: completed_at.map(utc_from_ms),
    })
}
