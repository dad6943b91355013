//! Settings configuration types

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tracker::RetryPolicy;

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// User acted on when a command is given no `--user`
    #[serde(default = "default_user")]
    pub default_user: String,

    /// Where `progress.db` lives. Defaults to `~/.growquest/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Read-only HTTP API
    #[serde(default)]
    pub server: ServerSettings,

    /// Retry budget for conflicting progression writes
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Default: 8787
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Shared secret expected in `X-Growquest-Token`.
    ///
    /// If empty, requests are not authenticated.
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff; doubles on every further conflict
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
}

fn default_user() -> String {
    "me".to_string()
}

fn default_server_port() -> u16 {
    8787
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_backoff_ms() -> u64 {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            data_dir: None,
            server: ServerSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            token: String::new(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_backoff_ms))
    }
}
