use anyhow::{Result, bail};
use clap::Subcommand;

use growquest::domain::UserId;

use super::Session;

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a user (or rename an existing one)
    Add {
        id: String,

        /// Display name (default: the id)
        #[arg(long)]
        name: Option<String>,
    },

    /// Make a user the default for commands run without --user
    Switch { id: String },
}

pub fn user_command(session: &Session, command: UserCommand) -> Result<()> {
    match command {
        UserCommand::Add { id, name } => {
            let id = UserId::parse(&id)?;
            let created = session.tracker.add_user(&id, name.as_deref())?;
            if created {
                println!("User added: {}", id);
            } else if let Some(name) = name {
                session.tracker.store().users().rename(&id, &name)?;
                println!("User renamed: {} -> {}", id, name.trim());
            } else {
                println!("User already exists: {}", id);
            }
        }
        UserCommand::Switch { id } => {
            let id = UserId::parse(&id)?;
            if session.tracker.user(&id)?.is_none() {
                bail!("Unknown user: {} (add it with `growquest user add {}`)", id, id);
            }

            let mut config = session.config.clone();
            config.settings.default_user = id.to_string();
            config.save_to_file(&session.config_path)?;
            println!("Default user: {}", id);
        }
    }
    Ok(())
}
