//! XP ledger listing

use anyhow::Result;
use chrono::Local;

use super::Session;

pub fn history_command(session: &Session, limit: usize, json: bool) -> Result<()> {
    let events = session.tracker.history(&session.user, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }
    if events.is_empty() {
        println!("No XP recorded yet.");
        return Ok(());
    }

    for event in &events {
        let at = event.created_at.with_timezone(&Local);
        println!(
            "{}  {:>6} XP  {:<6} {}",
            at.format("%Y-%m-%d %H:%M"),
            event.delta.to_string(),
            event.source,
            event.source_id.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
