//! CLI command implementations

pub mod award;
pub mod goal;
pub mod history;
pub mod init;
pub mod leaderboard;
pub mod meal;
pub mod serve;
pub mod status;
pub mod task;
pub mod user;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use growquest::config::Config;
use growquest::domain::UserId;
use growquest::progression::{ProgressionEvent, ProgressionOutcome};
use growquest::store::Store;
use growquest::tracker::Tracker;

/// Everything a command needs: config, an open tracker and the acting user
pub struct Session {
    pub config: Config,
    /// File the config was read from
    pub config_path: PathBuf,
    pub tracker: Tracker,
    pub user: UserId,
}

impl Session {
    pub fn open(config_path: Option<&Path>, user: Option<&str>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::global_config_path);
        let engine = config.engine()?;
        let user = config.resolve_user(user)?;

        let db_path = config.db_path();
        let store = Store::open(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        let tracker = Tracker::new(store, engine, config.settings.retry.policy());

        Ok(Self {
            config,
            config_path,
            tracker,
            user,
        })
    }
}

/// Print what an XP change did, one line per event
pub fn print_outcome(outcome: &ProgressionOutcome) {
    for event in &outcome.events {
        match event {
            ProgressionEvent::XpAwarded { amount, .. } => println!("  +{} XP", amount),
            ProgressionEvent::XpRevoked { amount, .. } => println!("  -{} XP", amount),
            ProgressionEvent::LevelUp(level_up) => println!(
                "  Level up! {} -> {} ({})",
                level_up.old_level, level_up.new_level, level_up.new_title
            ),
            ProgressionEvent::StreakExtended { count } => {
                println!("  Streak: {} days", count)
            }
            ProgressionEvent::StreakStarted => println!("  Streak started"),
            ProgressionEvent::BadgeEarned { badge } => println!("  New badge: {}", badge),
        }
    }
    println!("  Total: {} XP", outcome.state.total_xp);
}
