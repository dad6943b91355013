//! Tracker - turns task, goal and meal events into XP
//!
//! Every XP change runs inside a conflict-retried `load -> apply -> save`
//! cycle, so concurrent writers (CLI and server, or two CLI invocations) never
//! lose an award. Task and goal completions commit their completion record in
//! the same transaction as the XP change, which keeps the two in step.

mod retry;

pub use retry::{RetryPolicy, apply_with_retry, retry_on_conflict};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    DailyCompletions, DomainError, Goal, NewGoal, NewTask, Task, TaskCatalog, UserId,
};
use crate::progression::{
    PlayerStats, ProgressionEngine, ProgressionEvent, ProgressionOutcome, XpDelta, XpRewards,
};
use crate::store::{
    CompletionChange, LeaderboardEntry, ProgressionStore, Store, StoreError, UserRecord, XpEvent,
    XpSource,
};

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Gave up updating {user_id} after {attempts} conflicting writes")]
    RetriesExhausted { user_id: String, attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Application service over the store and the progression engine
#[derive(Clone)]
pub struct Tracker {
    store: Store,
    engine: ProgressionEngine,
    retry: RetryPolicy,
}

impl Tracker {
    pub fn new(store: Store, engine: ProgressionEngine, retry: RetryPolicy) -> Self {
        Self {
            store,
            engine,
            retry,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    /// Apply a signed XP change and record it in the ledger
    pub fn award(
        &self,
        user: &UserId,
        delta: XpDelta,
        source: XpSource,
        source_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<ProgressionOutcome, TrackerError> {
        let progress = self.store.progress();

        if delta == XpDelta::ZERO {
            let current = progress.load_progression_state(user)?;
            return Ok(ProgressionOutcome {
                state: current.value,
                events: Vec::new(),
            });
        }

        let reason = award_reason(source, source_id);
        let outcome =
            apply_with_retry(&progress, &self.engine, &self.retry, user, delta, today, &reason)?;
        self.record_award(user, delta, source, source_id, today, &outcome);
        Ok(outcome)
    }

    /// Ledger entry and log lines for a committed XP change
    fn record_award(
        &self,
        user: &UserId,
        delta: XpDelta,
        source: XpSource,
        source_id: Option<&str>,
        today: NaiveDate,
        outcome: &ProgressionOutcome,
    ) {
        let event = XpEvent {
            delta,
            source,
            source_id: source_id.map(str::to_string),
            day: today,
            created_at: Utc::now(),
        };
        // XP is already committed at this point
        if let Err(e) = self.store.progress().record_xp_event(user, &event) {
            warn!("[growquest:tracker] Failed to record ledger entry for {}: {}", user, e);
        }

        if let Some(level_up) = outcome.level_up() {
            info!(
                "[growquest:tracker] {} reached level {} ({})",
                user, level_up.new_level, level_up.new_title
            );
        }
        for e in &outcome.events {
            if let ProgressionEvent::BadgeEarned { badge } = e {
                info!("[growquest:tracker] {} earned the {} badge", user, badge);
            }
        }
    }

    // === Users ===

    pub fn add_user(&self, user: &UserId, name: Option<&str>) -> Result<bool, TrackerError> {
        Ok(self.store.users().ensure(user, name)?)
    }

    pub fn user(&self, user: &UserId) -> Result<Option<UserRecord>, TrackerError> {
        Ok(self.store.users().get(user)?)
    }

    // === Tasks ===

    /// The user's catalog and what they have completed on `today`
    pub fn task_board(
        &self,
        user: &UserId,
        today: NaiveDate,
    ) -> Result<(TaskCatalog, DailyCompletions), TrackerError> {
        let tasks = self.store.tasks();
        Ok((tasks.catalog(user)?, tasks.completions(user, today)?))
    }

    pub fn add_task(&self, user: &UserId, draft: NewTask) -> Result<Task, TrackerError> {
        let task = Task::create_custom(draft)?;
        self.store.tasks().add_custom(user, &task)?;
        Ok(task)
    }

    /// Complete a task for `today`. Returns `None` if it was already done.
    pub fn complete_task(
        &self,
        user: &UserId,
        task_id: &str,
        today: NaiveDate,
    ) -> Result<Option<ProgressionOutcome>, TrackerError> {
        self.change_task(user, task_id, today, true)
    }

    /// Undo a completion made on `today`. Returns `None` if there was none.
    pub fn uncomplete_task(
        &self,
        user: &UserId,
        task_id: &str,
        today: NaiveDate,
    ) -> Result<Option<ProgressionOutcome>, TrackerError> {
        self.change_task(user, task_id, today, false)
    }

    fn change_task(
        &self,
        user: &UserId,
        task_id: &str,
        today: NaiveDate,
        done: bool,
    ) -> Result<Option<ProgressionOutcome>, TrackerError> {
        let tasks = self.store.tasks();
        let progress = self.store.progress();
        let catalog = tasks.catalog(user)?;
        let task = catalog.require(task_id)?;
        let reason = award_reason(XpSource::Task, Some(&task.id));

        let committed = retry_on_conflict(&self.retry, user, || {
            let current = progress.load_progression_state(user)?;
            let mut completions = tasks.completions(user, today)?;
            let (delta, change) = if done {
                let change = CompletionChange::TaskDone {
                    day: today,
                    task_id: &task.id,
                };
                (completions.complete(task, today), change)
            } else {
                let change = CompletionChange::TaskUndone {
                    day: today,
                    task_id: &task.id,
                };
                (completions.uncomplete(task, today), change)
            };
            let Some(delta) = delta else {
                return Ok(None);
            };

            let outcome = self.engine.apply(&current.value, delta, today, &reason);
            progress.save_with_completion(user, current.version, &outcome.state, change)?;
            Ok(Some((delta, outcome)))
        })?;

        Ok(committed.map(|(delta, outcome)| {
            self.record_award(user, delta, XpSource::Task, Some(&task.id), today, &outcome);
            outcome
        }))
    }

    // === Goals ===

    pub fn goals(&self, user: &UserId) -> Result<Vec<Goal>, TrackerError> {
        Ok(self.store.goals().list(user)?)
    }

    pub fn add_goal(&self, user: &UserId, draft: NewGoal) -> Result<Goal, TrackerError> {
        let goal = Goal::create(draft, Utc::now())?;
        self.store.goals().insert(user, &goal)?;
        Ok(goal)
    }

    /// Set a goal's completion flag.
    ///
    /// Returns `None` when the goal already had that flag, including when a
    /// concurrent writer set it first.
    pub fn set_goal_completed(
        &self,
        user: &UserId,
        goal_id: Uuid,
        completed: bool,
        today: NaiveDate,
    ) -> Result<Option<ProgressionOutcome>, TrackerError> {
        self.change_goal(user, goal_id, today, |goal| {
            goal.set_completed(completed, Utc::now())
        })
    }

    /// Flip a goal's completion flag as stored at the time of the write
    pub fn toggle_goal(
        &self,
        user: &UserId,
        goal_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<ProgressionOutcome>, TrackerError> {
        self.change_goal(user, goal_id, today, |goal| Some(goal.toggle(Utc::now())))
    }

    fn change_goal(
        &self,
        user: &UserId,
        goal_id: Uuid,
        today: NaiveDate,
        change: impl Fn(&mut Goal) -> Option<XpDelta>,
    ) -> Result<Option<ProgressionOutcome>, TrackerError> {
        let goals = self.store.goals();
        let progress = self.store.progress();
        let source_id = goal_id.to_string();
        let reason = award_reason(XpSource::Goal, Some(&source_id));

        let committed = retry_on_conflict(&self.retry, user, || {
            let current = progress.load_progression_state(user)?;
            let mut goal = goals
                .get(user, goal_id)?
                .ok_or_else(|| StoreError::NotFound(format!("goal {}", goal_id)))?;

            let previous = goal.completed;
            let Some(delta) = change(&mut goal) else {
                return Ok(None);
            };

            let outcome = self.engine.apply(&current.value, delta, today, &reason);
            progress.save_with_completion(
                user,
                current.version,
                &outcome.state,
                CompletionChange::Goal {
                    goal: &goal,
                    previous,
                },
            )?;
            Ok(Some((delta, outcome)))
        })?;

        Ok(committed.map(|(delta, outcome)| {
            self.record_award(user, delta, XpSource::Goal, Some(&source_id), today, &outcome);
            outcome
        }))
    }

    /// Delete a goal. XP already earned from it is kept.
    pub fn delete_goal(&self, user: &UserId, goal_id: Uuid) -> Result<(), TrackerError> {
        if !self.store.goals().delete(user, goal_id)? {
            return Err(StoreError::NotFound(format!("goal {}", goal_id)).into());
        }
        Ok(())
    }

    // === Meals ===

    pub fn log_meal(
        &self,
        user: &UserId,
        description: &str,
        today: NaiveDate,
    ) -> Result<ProgressionOutcome, TrackerError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(DomainError::EmptyText.into());
        }
        self.award(
            user,
            XpDelta::award(XpRewards::MEAL_LOGGED),
            XpSource::Meal,
            Some(description),
            today,
        )
    }

    // === Reads ===

    pub fn player_stats(&self, user: &UserId, today: NaiveDate) -> Result<PlayerStats, TrackerError> {
        let state = self.store.progress().load_progression_state(user)?.value;
        Ok(self.engine.player_stats(&state, today))
    }

    pub fn leaderboard(
        &self,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>, TrackerError> {
        Ok(self.store.leaderboard().top(&self.engine, today, limit)?)
    }

    pub fn history(&self, user: &UserId, limit: usize) -> Result<Vec<XpEvent>, TrackerError> {
        Ok(self.store.progress().recent_events(user, limit)?)
    }
}

fn award_reason(source: XpSource, source_id: Option<&str>) -> String {
    match source_id {
        Some(id) => format!("{} {}", source, id),
        None => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tracker() -> Tracker {
        Tracker::new(
            Store::open_in_memory().unwrap(),
            ProgressionEngine::default(),
            RetryPolicy::default(),
        )
    }

    #[test]
    fn test_task_completion_awards_once() {
        let tracker = tracker();
        let alice = UserId::parse("alice").unwrap();
        let today = date("2024-01-05");

        let first = tracker.complete_task(&alice, "exercise", today).unwrap();
        assert_eq!(first.unwrap().state.total_xp, 30);
        assert!(tracker.complete_task(&alice, "exercise", today).unwrap().is_none());
        assert_eq!(tracker.player_stats(&alice, today).unwrap().total_xp, 30);

        let undone = tracker.uncomplete_task(&alice, "exercise", today).unwrap();
        assert_eq!(undone.unwrap().state.total_xp, 0);
        assert!(tracker.uncomplete_task(&alice, "exercise", today).unwrap().is_none());
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        let tracker = tracker();
        let alice = UserId::parse("alice").unwrap();
        let err = tracker
            .complete_task(&alice, "juggling", date("2024-01-05"))
            .unwrap_err();
        assert!(matches!(err, TrackerError::Domain(DomainError::UnknownTask(_))));
    }

    #[test]
    fn test_goal_lifecycle() {
        let tracker = tracker();
        let alice = UserId::parse("alice").unwrap();
        let today = date("2024-01-05");

        let goal = tracker
            .add_goal(
                &alice,
                NewGoal {
                    text: "Run a 5k".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        let done = tracker.set_goal_completed(&alice, goal.id, true, today).unwrap();
        assert_eq!(done.unwrap().state.total_xp, 25);
        // Completing again is a no-op
        assert!(tracker.set_goal_completed(&alice, goal.id, true, today).unwrap().is_none());

        let reopened = tracker.toggle_goal(&alice, goal.id, today).unwrap();
        assert_eq!(reopened.unwrap().state.total_xp, 0);

        tracker.toggle_goal(&alice, goal.id, today).unwrap();
        tracker.delete_goal(&alice, goal.id).unwrap();
        // Deleting keeps earned XP
        assert_eq!(tracker.player_stats(&alice, today).unwrap().total_xp, 25);
        assert!(matches!(
            tracker.delete_goal(&alice, goal.id),
            Err(TrackerError::Store(StoreError::NotFound(_)))
        ));
    }

    #[test]
    fn test_meal_and_history() {
        let tracker = tracker();
        let alice = UserId::parse("alice").unwrap();
        let today = date("2024-01-05");

        tracker.log_meal(&alice, "oatmeal", today).unwrap();
        tracker.complete_task(&alice, "water", today).unwrap();

        let stats = tracker.player_stats(&alice, today).unwrap();
        assert_eq!(stats.total_xp, u64::from(XpRewards::MEAL_LOGGED) + 10);
        assert_eq!(stats.daily_xp, stats.total_xp);
        assert_eq!(stats.streak_days, 1);

        let history = tracker.history(&alice, 10).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().any(|e| e.source == XpSource::Meal));
        assert!(tracker.log_meal(&alice, "  ", today).is_err());
    }

    #[test]
    fn test_zero_delta_writes_nothing() {
        let tracker = tracker();
        let alice = UserId::parse("alice").unwrap();
        let outcome = tracker
            .award(&alice, XpDelta::ZERO, XpSource::Manual, None, date("2024-01-05"))
            .unwrap();
        assert!(outcome.events.is_empty());
        assert!(tracker.history(&alice, 10).unwrap().is_empty());
    }
}
