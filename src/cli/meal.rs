//! Meal logging

use anyhow::Result;
use clap::Subcommand;

use growquest::progression::local_today;

use super::{Session, print_outcome};

#[derive(Subcommand)]
pub enum MealCommand {
    /// Log a meal (awards a fixed amount of XP)
    Log { description: Vec<String> },
}

pub fn meal_command(session: &Session, command: MealCommand) -> Result<()> {
    match command {
        MealCommand::Log { description } => {
            let description = description.join(" ");
            let outcome = session
                .tracker
                .log_meal(&session.user, &description, local_today())?;
            println!("Meal logged: {}", description.trim());
            print_outcome(&outcome);
        }
    }
    Ok(())
}
