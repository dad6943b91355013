//! Manual XP adjustments

use anyhow::{Context, Result};

use growquest::progression::{XpDelta, local_today};
use growquest::store::XpSource;

use super::{Session, print_outcome};

/// Apply a signed XP amount such as `25` or `-10`
pub fn award_command(session: &Session, amount: &str, reason: Option<&str>) -> Result<()> {
    let delta: XpDelta = amount
        .parse()
        .with_context(|| format!("Invalid XP amount: '{}'", amount))?;

    let outcome = session.tracker.award(
        &session.user,
        delta,
        XpSource::Manual,
        reason,
        local_today(),
    )?;

    println!("{} {} XP", session.user, delta);
    print_outcome(&outcome);
    Ok(())
}
