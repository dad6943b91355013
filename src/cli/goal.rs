//! Goal commands

use anyhow::{Context, Result};
use clap::Subcommand;
use uuid::Uuid;

use growquest::domain::{Category, Goal, NewGoal};
use growquest::progression::local_today;

use super::{Session, print_outcome};

#[derive(Subcommand)]
pub enum GoalCommand {
    /// List goals
    List {
        #[arg(long)]
        json: bool,
    },

    /// Create a goal
    Add {
        text: String,

        /// health, productivity, learning, mindfulness or social
        #[arg(long)]
        category: Option<Category>,

        /// XP awarded on completion (default depends on category)
        #[arg(long)]
        xp: Option<u32>,
    },

    /// Mark a goal completed
    Done { id: String },

    /// Reopen a completed goal
    Undo { id: String },

    /// Complete an open goal or reopen a completed one
    Toggle { id: String },

    /// Delete a goal (earned XP is kept)
    Delete { id: String },
}

pub fn goal_command(session: &Session, command: GoalCommand) -> Result<()> {
    let tracker = &session.tracker;
    let user = &session.user;
    let today = local_today();

    match command {
        GoalCommand::List { json } => {
            let goals = tracker.goals(user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&goals)?);
            } else if goals.is_empty() {
                println!("No goals yet.");
            } else {
                for goal in &goals {
                    print_goal(goal);
                }
            }
        }
        GoalCommand::Add { text, category, xp } => {
            let goal = tracker.add_goal(
                user,
                NewGoal {
                    text,
                    category,
                    xp_value: xp,
                },
            )?;
            println!("Goal added:");
            print_goal(&goal);
        }
        GoalCommand::Done { id } => {
            let id = find_goal_id(session, &id)?;
            match tracker.set_goal_completed(user, id, true, today)? {
                Some(outcome) => print_outcome(&outcome),
                None => println!("Goal already completed"),
            }
        }
        GoalCommand::Undo { id } => {
            let id = find_goal_id(session, &id)?;
            match tracker.set_goal_completed(user, id, false, today)? {
                Some(outcome) => print_outcome(&outcome),
                None => println!("Goal is not completed"),
            }
        }
        GoalCommand::Toggle { id } => {
            let id = find_goal_id(session, &id)?;
            if let Some(outcome) = tracker.toggle_goal(user, id, today)? {
                print_outcome(&outcome);
            }
        }
        GoalCommand::Delete { id } => {
            let id = find_goal_id(session, &id)?;
            tracker.delete_goal(user, id)?;
            println!("Goal deleted: {}", id);
        }
    }
    Ok(())
}

fn print_goal(goal: &Goal) {
    let mark = if goal.completed { "x" } else { " " };
    let short_id = &goal.id.simple().to_string()[..8];
    println!(
        "[{}] {} {} {:>3} XP  {} ({})",
        mark,
        short_id,
        goal.category.icon(),
        goal.xp_value,
        goal.text,
        goal.category
    );
}

/// Accept a full UUID or a unique prefix of the simple form
fn find_goal_id(session: &Session, raw: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }

    let prefix = raw.trim().to_lowercase().replace('-', "");
    if prefix.is_empty() {
        anyhow::bail!("Goal id is empty");
    }
    let goals = session.tracker.goals(&session.user)?;
    let mut matches = goals
        .iter()
        .filter(|g| g.id.simple().to_string().starts_with(&prefix));

    let first = matches
        .next()
        .with_context(|| format!("No goal matches '{}'", raw))?;
    if matches.next().is_some() {
        anyhow::bail!("Goal id '{}' is ambiguous", raw);
    }
    Ok(first.id)
}
