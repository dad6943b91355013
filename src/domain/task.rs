use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::error::DomainError;
use crate::progression::XpDelta;

const DEFAULT_CUSTOM_TASK_XP: u32 = 15;

/// A daily task, either from the built-in catalog or created by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub xp: u32,
    pub category: Category,
    pub icon: String,
    #[serde(default)]
    pub custom: bool,
}

/// User input for a custom task
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub name: String,
    #[serde(default)]
    pub xp: Option<u32>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Task {
    /// Build a custom task from user input, filling defaults
    pub fn create_custom(draft: NewTask) -> Result<Self, DomainError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyText);
        }
        let xp = draft.xp.unwrap_or(DEFAULT_CUSTOM_TASK_XP);
        if xp == 0 {
            return Err(DomainError::ZeroXp);
        }
        let category = draft.category.unwrap_or(Category::Productivity);
        let icon = draft
            .icon
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| category.icon().to_string());

        Ok(Self {
            id: format!("custom-{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            xp,
            category,
            icon,
            custom: true,
        })
    }

    fn builtin(id: &str, name: &str, xp: u32, category: Category, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            xp,
            category,
            icon: icon.to_string(),
            custom: false,
        }
    }
}

/// The tasks available to a user: built-ins plus their custom tasks
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
}

impl TaskCatalog {
    pub fn builtin() -> Self {
        Self {
            tasks: vec![
                Task::builtin("water", "Drink 8 glasses of water", 10, Category::Health, "💧"),
                Task::builtin("exercise", "Exercise for 30 minutes", 30, Category::Health, "🏃"),
                Task::builtin("sleep", "Sleep 8 hours", 20, Category::Health, "😴"),
                Task::builtin("meditate", "Meditate for 10 minutes", 20, Category::Mindfulness, "🧘"),
                Task::builtin("read", "Read 20 pages", 20, Category::Learning, "📚"),
                Task::builtin("plan", "Plan tomorrow", 15, Category::Productivity, "📝"),
                Task::builtin("connect", "Reach out to a friend", 15, Category::Social, "💬"),
            ],
        }
    }

    pub fn with_custom(custom: impl IntoIterator<Item = Task>) -> Self {
        let mut catalog = Self::builtin();
        for task in custom {
            if catalog.get(&task.id).is_none() {
                catalog.tasks.push(task);
            }
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Task, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::UnknownTask(id.to_string()))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn total_xp(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.xp)).sum()
    }
}

/// Task ids completed on one local day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCompletions {
    pub date: NaiveDate,
    pub completed: BTreeSet<String>,
}

impl DailyCompletions {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed: BTreeSet::new(),
        }
    }

    /// Clear the set when the local day has changed. Returns true if it rolled over.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.date == today {
            return false;
        }
        self.date = today;
        self.completed.clear();
        true
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.completed.contains(task_id)
    }

    /// Mark `task` done on `today`; `+xp` only the first time that day
    pub fn complete(&mut self, task: &Task, today: NaiveDate) -> Option<XpDelta> {
        self.roll_over(today);
        self.completed
            .insert(task.id.clone())
            .then(|| XpDelta::award(task.xp))
    }

    /// Undo `task` on `today`; `-xp` only if it was done today
    pub fn uncomplete(&mut self, task: &Task, today: NaiveDate) -> Option<XpDelta> {
        self.roll_over(today);
        self.completed
            .remove(&task.id)
            .then(|| XpDelta::revoke(task.xp))
    }

    /// XP earned from the completed tasks that are still in `catalog`
    pub fn earned_xp(&self, catalog: &TaskCatalog) -> u64 {
        self.completed
            .iter()
            .filter_map(|id| catalog.get(id))
            .map(|t| u64::from(t.xp))
            .sum()
    }
}
