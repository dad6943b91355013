//! Status command implementation

use anyhow::Result;

use growquest::progression::local_today;

use super::Session;

/// Show level, badge, streak and today's XP for the acting user
pub fn status_command(session: &Session, json: bool) -> Result<()> {
    let today = local_today();
    let stats = session.tracker.player_stats(&session.user, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", session.user);
    println!(
        "  Level {} - {} ({} XP)",
        stats.level, stats.title, stats.total_xp
    );
    if stats.is_max_level() {
        println!("  Max level reached");
    } else {
        println!(
            "  Next level at {} XP: {} to go ({:.0}%)",
            stats.next_level_xp.unwrap_or_default(),
            stats.xp_to_next_level.unwrap_or_default(),
            stats.progress_percent
        );
    }
    println!("  Badge: {} {}", stats.badge.icon, stats.badge.name);
    println!(
        "  Streak: {} days (best {})",
        stats.streak_days, stats.best_streak
    );
    println!("  Today: {} XP", stats.daily_xp);

    let (catalog, done) = session.tracker.task_board(&session.user, today)?;
    println!(
        "  Tasks: {}/{} done today",
        done.completed.iter().filter(|id| catalog.get(id).is_some()).count(),
        catalog.tasks().len()
    );
    Ok(())
}
