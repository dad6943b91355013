//! Validation errors for user-created records

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Text must not be empty")]
    EmptyText,

    #[error("XP value must be positive")]
    ZeroXp,

    #[error("Unknown category: {0} (expected health, productivity, learning, mindfulness or social)")]
    UnknownCategory(String),

    #[error("Invalid user id '{0}': use 1-64 letters, digits, '-' or '_'")]
    InvalidUserId(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),
}
