//! Leaderboard: all users ranked by total XP

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::StoreError;
use super::db::{ProgressDb, utc_from_ms, xp_from_sql};
use crate::domain::UserId;
use crate::progression::ProgressionEngine;
use crate::progression::streaks::{is_active, parse_day};

/// Raw per-user numbers as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub name: String,
    pub total_xp: u64,
    pub streak_days: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub name: String,
    pub total_xp: u64,
    pub level: u32,
    pub title: String,
    pub badge: String,
    pub streak: u32,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Order rows by total XP descending, ties by user id, and number them from 1.
/// Level, title and badge are derived from XP, never read from storage.
pub fn rank_entries(
    mut rows: Vec<LeaderboardRow>,
    engine: &ProgressionEngine,
    today: NaiveDate,
) -> Vec<LeaderboardEntry> {
    rows.sort_by(|a, b| {
        b.total_xp
            .cmp(&a.total_xp)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let tier = engine.levels().tier_for_xp(row.total_xp);
            let streak = if is_active(row.last_activity_date, today) {
                row.streak_days
            } else {
                0
            };
            LeaderboardEntry {
                rank: i + 1,
                level: tier.level,
                title: tier.title.clone(),
                badge: engine.badge_for_xp(row.total_xp).name.clone(),
                user_id: row.user_id,
                name: row.name,
                total_xp: row.total_xp,
                streak,
                last_updated: row.last_updated,
            }
        })
        .collect()
}

pub struct LeaderboardQuery {
    db: ProgressDb,
}

impl LeaderboardQuery {
    pub fn new(db: ProgressDb) -> Self {
        Self { db }
    }

    /// Every known user, including those with no progress yet
    pub fn rows(&self) -> Result<Vec<LeaderboardRow>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT u.id, u.name, COALESCE(p.total_xp, 0), COALESCE(p.streak_days, 0),
                      p.last_activity_day, p.updated_at
               FROM users u LEFT JOIN progression p ON p.user_id = u.id"#,
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, i64>(2)?,
                r.get::<_, u32>(3)?,
                r.get::<_, Option<String>>(4)?,
                r.get::<_, Option<i64>>(5)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, name, total_xp, streak_days, last_day, updated_at) = row?;
            let user_id = UserId::parse(&id)
                .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
            out.push(LeaderboardRow {
                user_id,
                name,
                total_xp: xp_from_sql(total_xp),
                streak_days,
                last_activity_date: last_day.as_deref().and_then(parse_day),
                last_updated: updated_at.map(utc_from_ms),
            });
        }
        Ok(out)
    }

    /// Ranked entries, optionally cut to the first `limit`
    pub fn top(
        &self,
        engine: &ProgressionEngine,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut entries = rank_entries(self.rows()?, engine, today);
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(id: &str, xp: u64) -> LeaderboardRow {
        LeaderboardRow {
            user_id: UserId::parse(id).unwrap(),
            name: id.to_string(),
            total_xp: xp,
            streak_days: 3,
            last_activity_date: Some(date("2024-01-05")),
            last_updated: None,
        }
    }

    #[test]
    fn test_rank_by_xp_then_id() {
        let engine = ProgressionEngine::default();
        let rows = vec![row("carol", 250), row("bob", 600), row("alice", 250), row("dave", 0)];
        let ranked = rank_entries(rows, &engine, date("2024-01-05"));

        let order: Vec<_> = ranked.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["bob", "alice", "carol", "dave"]);
        assert_eq!(
            ranked.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(ranked[0].level, 5);
        assert_eq!(ranked[0].badge, "Silver");
        assert_eq!(ranked[1].level, 3);
        assert_eq!(ranked[1].title, "Sprout");
        assert_eq!(ranked[3].badge, "Bronze");
    }

    #[test]
    fn test_lapsed_streak_shows_zero() {
        let engine = ProgressionEngine::default();
        let ranked = rank_entries(vec![row("alice", 10)], &engine, date("2024-01-05"));
        assert_eq!(ranked[0].streak, 3);
        let ranked = rank_entries(vec![row("alice", 10)], &engine, date("2024-01-07"));
        assert_eq!(ranked[0].streak, 0);
    }

    #[test]
    fn test_query_includes_users_without_progress() {
        let db = ProgressDb::open_in_memory().unwrap();
        super::super::UserRepo::new(db.clone())
            .ensure(&UserId::parse("newbie").unwrap(), Some("Newbie"))
            .unwrap();

        let query = LeaderboardQuery::new(db);
        let entries = query
            .top(&ProgressionEngine::default(), date("2024-01-05"), Some(10))
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total_xp, 0);
        assert_eq!(entries[0].level, 1);
        assert_eq!(entries[0].name, "Newbie");
    }
}
