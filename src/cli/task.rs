//! Daily task commands

use anyhow::Result;
use clap::Subcommand;

use growquest::domain::{Category, NewTask};
use growquest::progression::local_today;

use super::{Session, print_outcome};

#[derive(Subcommand)]
pub enum TaskCommand {
    /// List available tasks and today's completions
    List {
        #[arg(long)]
        json: bool,
    },

    /// Create a custom task
    Add {
        name: String,

        /// XP per completion (default: 15)
        #[arg(long)]
        xp: Option<u32>,

        /// health, productivity, learning, mindfulness or social
        #[arg(long)]
        category: Option<Category>,

        #[arg(long)]
        icon: Option<String>,
    },

    /// Mark a task done for today
    Done { task_id: String },

    /// Undo today's completion of a task
    Undo { task_id: String },
}

pub fn task_command(session: &Session, command: TaskCommand) -> Result<()> {
    let tracker = &session.tracker;
    let user = &session.user;
    let today = local_today();

    match command {
        TaskCommand::List { json } => {
            let (catalog, done) = tracker.task_board(user, today)?;
            if json {
                let rows: Vec<_> = catalog
                    .tasks()
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "task": t,
                            "completed": done.is_completed(&t.id),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            for task in catalog.tasks() {
                let mark = if done.is_completed(&task.id) { "x" } else { " " };
                println!(
                    "[{}] {} {:<12} {:>3} XP  {}",
                    mark, task.icon, task.id, task.xp, task.name
                );
            }
            println!(
                "\nEarned today: {} / {} XP",
                done.earned_xp(&catalog),
                catalog.total_xp()
            );
        }
        TaskCommand::Add {
            name,
            xp,
            category,
            icon,
        } => {
            let task = tracker.add_task(
                user,
                NewTask {
                    name,
                    xp,
                    category,
                    icon,
                },
            )?;
            println!("Task added: {} ({} XP, id {})", task.name, task.xp, task.id);
        }
        TaskCommand::Done { task_id } => match tracker.complete_task(user, &task_id, today)? {
            Some(outcome) => {
                println!("Completed {}", task_id);
                print_outcome(&outcome);
            }
            None => println!("{} is already done today", task_id),
        },
        TaskCommand::Undo { task_id } => match tracker.uncomplete_task(user, &task_id, today)? {
            Some(outcome) => {
                println!("Undid {}", task_id);
                print_outcome(&outcome);
            }
            None => println!("{} was not done today", task_id),
        },
    }
    Ok(())
}
