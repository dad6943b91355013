//! Custom tasks and per-day task completions

use chrono::NaiveDate;
use rusqlite::Connection;

use super::StoreError;
use super::db::{ProgressDb, now_ms};
use super::users::ensure_user_row;
use crate::domain::{Category, DailyCompletions, Task, TaskCatalog, UserId};
use crate::progression::streaks::day_string;

#[derive(Clone)]
pub struct TaskRepo {
    db: ProgressDb,
}

impl TaskRepo {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    pub fn add_custom(&self, user: &UserId, task: &Task) -> Result<(), StoreError> {
        let conn = self.db.conn();
        ensure_user_row(&conn, user)?;
        conn.execute(
            r#"INSERT INTO custom_tasks (id, user_id, name, xp, category, icon, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            rusqlite::params![
                task.id,
                user.as_str(),
                task.name,
                task.xp,
                task.category.as_str(),
                task.icon,
                now_ms(),
            ],
        )?;
        Ok(())
    }

    pub fn list_custom(&self, user: &UserId) -> Result<Vec<Task>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT id, name, xp, category, icon FROM custom_tasks
               WHERE user_id = ?1 ORDER BY created_at, id"#,
        )?;
        let rows = stmt.query_map([user.as_str()], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, u32>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
            ))
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, name, xp, category, icon) = row?;
            let category: Category = category
                .parse()
                .map_err(|e| StoreError::InvalidRecord(format!("task {}: {}", id, e)))?;
            tasks.push(Task {
                id,
                name,
                xp,
                category,
                icon,
                custom: true,
            });
        }
        Ok(tasks)
    }

    /// Built-in tasks plus the user's custom ones
    pub fn catalog(&self, user: &UserId) -> Result<TaskCatalog, StoreError> {
        Ok(TaskCatalog::with_custom(self.list_custom(user)?))
    }

    pub fn completions(&self, user: &UserId, day: NaiveDate) -> Result<DailyCompletions, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT task_id FROM task_completions WHERE user_id = ?1 AND day = ?2",
        )?;
        let mut done = DailyCompletions::new(day);
        for task_id in stmt.query_map((user.as_str(), day_string(day)), |r| r.get::<_, String>(0))? {
            done.completed.insert(task_id?);
        }
        Ok(done)
    }
}

/// Record a completion. Returns false if the task was already done that day.
pub(super) fn insert_completion(
    conn: &Connection,
    user: &UserId,
    day: NaiveDate,
    task_id: &str,
) -> Result<bool, StoreError> {
    let inserted = conn.execute(
        r#"INSERT OR IGNORE INTO task_completions (user_id, day, task_id, completed_at)
           VALUES (?1, ?2, ?3, ?4)"#,
        (user.as_str(), day_string(day), task_id, now_ms()),
    )?;
    Ok(inserted == 1)
}

/// Remove a completion. Returns false if there was none.
pub(super) fn delete_completion(
    conn: &Connection,
    user: &UserId,
    day: NaiveDate,
    task_id: &str,
) -> Result<bool, StoreError> {
    let deleted = conn.execute(
        "DELETE FROM task_completions WHERE user_id = ?1 AND day = ?2 AND task_id = ?3",
        (user.as_str(), day_string(day), task_id),
    )?;
    Ok(deleted == 1)
}
