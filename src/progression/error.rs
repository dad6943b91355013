//! Errors raised by the progression engine

/// Failure modes of the pure progression engine.
///
/// Configuration errors are only produced while building tables, never while
/// looking values up in an already validated table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressionError {
    #[error("Invalid progression table: {0}")]
    Configuration(String),

    #[error("Invalid XP delta: {0}")]
    InvalidDelta(String),
}

impl ProgressionError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
