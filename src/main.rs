use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::Session;
use cli::goal::GoalCommand;
use cli::meal::MealCommand;
use cli::task::TaskCommand;
use cli::user::UserCommand;

#[derive(Parser)]
#[command(name = "growquest")]
#[command(about = "Growquest - earn XP for daily habits, goals and meals")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.growquest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// User to act as (defaults to settings.default_user)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ~/.growquest/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show level, badge and streak
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Add or remove XP by hand (e.g. `award 25`, `award -- -10`)
    Award {
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Note stored in the XP history
        #[arg(long)]
        reason: Option<String>,
    },

    /// Daily tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Goals
    #[command(subcommand)]
    Goal(GoalCommand),

    /// Meals
    #[command(subcommand)]
    Meal(MealCommand),

    /// Users ranked by total XP
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Users
    #[command(subcommand)]
    User(UserCommand),

    /// Recent XP changes
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Run the read-only HTTP API
    Serve {
        /// Port (defaults to settings.server.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = cli.command.unwrap_or(Commands::Status { json: false });
    let open_session = || Session::open(cli.config.as_deref(), cli.user.as_deref());

    match command {
        Commands::Init { force } => {
            cli::init::init_command(cli.config.clone(), force)?;
        }
        Commands::Status { json } => {
            cli::status::status_command(&open_session()?, json)?;
        }
        Commands::Award { amount, reason } => {
            cli::award::award_command(&open_session()?, &amount, reason.as_deref())?;
        }
        Commands::Task(cmd) => cli::task::task_command(&open_session()?, cmd)?,
        Commands::Goal(cmd) => cli::goal::goal_command(&open_session()?, cmd)?,
        Commands::Meal(cmd) => cli::meal::meal_command(&open_session()?, cmd)?,
        Commands::Leaderboard { limit, json } => {
            cli::leaderboard::leaderboard_command(&open_session()?, limit, json)?;
        }
        Commands::User(cmd) => cli::user::user_command(&open_session()?, cmd)?,
        Commands::History { limit, json } => {
            cli::history::history_command(&open_session()?, limit, json)?;
        }
        Commands::Serve { port } => {
            cli::serve::serve_command(open_session()?, port).await?;
        }
    }

    Ok(())
}
