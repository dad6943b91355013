//! User records

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use super::StoreError;
use super::db::{ProgressDb, now_ms, utc_from_ms};
use crate::domain::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Insert a users row named after the id unless one exists
pub(super) fn ensure_user_row(conn: &Connection, id: &UserId) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO users (id, name, created_at) VALUES (?1, ?1, ?2)",
        (id.as_str(), now_ms()),
    )?;
    Ok(())
}

#[derive(Clone)]
pub struct UserRepo {
    db: ProgressDb,
}

impl UserRepo {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    /// Create the user if missing. Returns true if a new row was inserted.
    pub fn ensure(&self, id: &UserId, name: Option<&str>) -> Result<bool, StoreError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(id.as_str());
        let conn = self.db.conn();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (id, name, created_at) VALUES (?1, ?2, ?3)",
            (id.as_str(), name, now_ms()),
        )?;
        Ok(inserted > 0)
    }

    pub fn rename(&self, id: &UserId, name: &str) -> Result<(), StoreError> {
        let conn = self.db.conn();
        let updated = conn.execute(
            "UPDATE users SET name = ?1 WHERE id = ?2",
            (name.trim(), id.as_str()),
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    pub fn get(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        let conn = self.db.conn();
        let row = conn
            .query_row(
                "SELECT name, created_at FROM users WHERE id = ?1",
                [id.as_str()],
                |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(name, created_at)| UserRecord {
            id: id.clone(),
            name,
            created_at: utc_from_ms(created_at),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_and_rename() {
        let db = ProgressDb::open_in_memory().unwrap();
        let users = UserRepo::new(db);
        let alice = UserId::parse("alice").unwrap();

        assert!(users.ensure(&alice, Some("Alice")).unwrap());
        assert!(!users.ensure(&alice, Some("Someone else")).unwrap());
        assert_eq!(users.get(&alice).unwrap().unwrap().name, "Alice");

        users.rename(&alice, "Alice B.").unwrap();
        assert_eq!(users.get(&alice).unwrap().unwrap().name, "Alice B.");

        let bob = UserId::parse("bob").unwrap();
        assert!(users.get(&bob).unwrap().is_none());
        assert!(matches!(users.rename(&bob, "Bob"), Err(StoreError::NotFound(_))));

        // Name defaults to the id
        users.ensure(&bob, None).unwrap();
        assert_eq!(users.get(&bob).unwrap().unwrap().name, "bob");
    }
}
