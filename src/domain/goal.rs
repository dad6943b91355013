use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::error::DomainError;
use crate::progression::XpDelta;

/// User input for a new goal; unset fields are filled by [`Goal::create`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGoal {
    pub text: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub xp_value: Option<u32>,
}

/// A user-created goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub text: String,
    pub category: Category,
    pub xp_value: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Goal {
    pub const DEFAULT_CATEGORY: Category = Category::Productivity;

    /// Build a goal from user input, filling defaults
    pub fn create(draft: NewGoal, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyText);
        }

        let category = draft.category.unwrap_or(Self::DEFAULT_CATEGORY);
        let xp_value = draft.xp_value.unwrap_or_else(|| category.default_goal_xp());
        if xp_value == 0 {
            return Err(DomainError::ZeroXp);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            category,
            xp_value,
            completed: false,
            created_at: now,
            completed_at: None,
        })
    }

    /// Set the completion flag.
    ///
    /// Returns the XP change only on an actual edge: `+xp_value` when the goal
    /// becomes completed, `-xp_value` when it is reopened, `None` otherwise.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) -> Option<XpDelta> {
        if self.completed == completed {
            return None;
        }
        self.completed = completed;
        self.completed_at = completed.then_some(now);
        Some(XpDelta::for_completion(self.xp_value, completed))
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) -> XpDelta {
        let target = !self.completed;
        self.set_completed(target, now).unwrap_or(XpDelta::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str) -> NewGoal {
        NewGoal {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_fills_defaults() {
        let goal = Goal::create(draft("  Run a 5k  "), Utc::now()).unwrap();
        assert_eq!(goal.text, "Run a 5k");
        assert_eq!(goal.category, Category::Productivity);
        assert_eq!(goal.xp_value, 25);
        assert!(!goal.completed);
        assert!(goal.completed_at.is_none());

        let goal = Goal::create(
            NewGoal {
                text: "Meditate".to_string(),
                category: Some(Category::Mindfulness),
                xp_value: None,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(goal.xp_value, 20);
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        assert_eq!(Goal::create(draft("   "), Utc::now()), Err(DomainError::EmptyText));
        let zero = NewGoal {
            text: "x".to_string(),
            category: None,
            xp_value: Some(0),
        };
        assert_eq!(Goal::create(zero, Utc::now()), Err(DomainError::ZeroXp));
    }

    #[test]
    fn test_completion_edges() {
        let now = Utc::now();
        let mut goal = Goal::create(draft("Read a book"), now).unwrap();

        assert_eq!(goal.set_completed(true, now), Some(XpDelta::award(25)));
        assert_eq!(goal.completed_at, Some(now));
        // Completing twice awards nothing
        assert_eq!(goal.set_completed(true, now), None);

        assert_eq!(goal.set_completed(false, now), Some(XpDelta::revoke(25)));
        assert!(goal.completed_at.is_none());
        assert_eq!(goal.set_completed(false, now), None);
    }

    #[test]
    fn test_toggle() {
        let now = Utc::now();
        let mut goal = Goal::create(draft("Call mom"), now).unwrap();
        assert_eq!(goal.toggle(now), XpDelta::award(25));
        assert_eq!(goal.toggle(now), XpDelta::revoke(25));
    }
}
