use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Life area a goal or task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Productivity,
    Learning,
    Mindfulness,
    Social,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Health,
        Category::Productivity,
        Category::Learning,
        Category::Mindfulness,
        Category::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Productivity => "productivity",
            Self::Learning => "learning",
            Self::Mindfulness => "mindfulness",
            Self::Social => "social",
        }
    }

    /// XP a goal in this category is worth when the user gives no value
    pub fn default_goal_xp(&self) -> u32 {
        match self {
            Self::Health => 30,
            Self::Productivity | Self::Learning => 25,
            Self::Mindfulness | Self::Social => 20,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Health => "💪",
            Self::Productivity => "📝",
            Self::Learning => "📚",
            Self::Mindfulness => "🧘",
            Self::Social => "💬",
        }
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| DomainError::UnknownCategory(s.to_string()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
