//! Configuration loading and management

mod io;
mod progression;
mod settings;

pub use progression::ProgressionConfig;
pub use settings::{RetrySettings, ServerSettings, Settings};

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::progression::ProgressionEngine;

/// Default configuration content for `growquest init`
pub const DEFAULT_CONFIG: &str = r##"# Growquest Configuration
# =======================
#
# Daily tasks, goals and meals earn XP. XP decides your level and badge;
# consecutive active days build a streak.

# ============================================================================
# SETTINGS
# ============================================================================
#
#   default_user - user acted on when a command gets no --user (default: "me")
#   data_dir     - directory holding progress.db (default: ~/.growquest)

[settings]
default_user = "me"

# Read-only JSON API started by `growquest serve`
[settings.server]
port = 8787
# Optional: shared secret sent as `X-Growquest-Token`
# Leave empty to disable auth (fine when bound to localhost)
token = ""

# Concurrent writers (CLI + server) are detected with a version check.
# A conflicting write re-reads and re-applies, waiting base_backoff_ms,
# then twice that, and so on.
[settings.retry]
max_attempts = 5
base_backoff_ms = 20

# ============================================================================
# PROGRESSION - optional custom tables
# ============================================================================
#
# Leave these commented out to use the built-in 15-level table (0..3500 XP)
# and the Bronze/Silver/Gold/Platinum/Diamond badges.
#
# Levels must start at level 1 with 0 XP, count up by one, and have strictly
# increasing thresholds. Badges must start at 0, leave no gaps
# (next min_xp = previous max_xp + 1) and end with one tier without max_xp.
#
# [[progression.levels]]
# level = 1
# xp_threshold = 0
# title = "Seedling"
#
# [[progression.levels]]
# level = 2
# xp_threshold = 100
# title = "Sprout"
#
# [[progression.badges]]
# name = "Bronze"
# min_xp = 0
# max_xp = 499
# color = "#cd7f32"
# icon = "🥉"
#
# [[progression.badges]]
# name = "Silver"
# min_xp = 500
# color = "#c0c0c0"
# icon = "🥈"
"##;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,

    /// Level and badge table overrides
    #[serde(default)]
    pub progression: ProgressionConfig,
}

impl Config {
    /// Build the progression engine. Malformed tables are a startup error.
    pub fn engine(&self) -> Result<ProgressionEngine> {
        self.progression
            .engine()
            .context("Invalid [progression] tables in config")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.settings
            .data_dir
            .clone()
            .unwrap_or_else(Self::global_config_dir)
    }

    /// Path of the SQLite database
    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("progress.db")
    }

    /// `explicit` if given, otherwise `settings.default_user`
    pub fn resolve_user(&self, explicit: Option<&str>) -> Result<UserId> {
        let raw = explicit.unwrap_or(&self.settings.default_user);
        UserId::parse(raw).with_context(|| format!("Invalid user id: '{}'", raw))
    }
}
