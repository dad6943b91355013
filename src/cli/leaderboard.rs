use anyhow::Result;

use growquest::progression::local_today;

use super::Session;

pub fn leaderboard_command(session: &Session, limit: usize, json: bool) -> Result<()> {
    let entries = session.tracker.leaderboard(local_today(), Some(limit))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No users yet.");
        return Ok(());
    }

    println!(
        "{:>4}  {:<20} {:>7}  {:<16} {:<9} {:>6}",
        "#", "User", "XP", "Level", "Badge", "Streak"
    );
    for e in &entries {
        let marker = if e.user_id == session.user { "*" } else { " " };
        println!(
            "{:>4}{} {:<20} {:>7}  {:<16} {:<9} {:>6}",
            e.rank,
            marker,
            e.name,
            e.total_xp,
            format!("{} {}", e.level, e.title),
            e.badge,
            e.streak
        );
    }
    Ok(())
}
