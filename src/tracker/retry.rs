//! Optimistic-concurrency retry loop around `load -> apply -> save`

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::TrackerError;
use crate::domain::UserId;
use crate::progression::{ProgressionEngine, ProgressionOutcome, XpDelta};
use crate::store::{ProgressionStore, StoreError};

/// Upper bound for a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1)
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(20),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Sleep before retry number `attempt` (1-based): base, 2x base, 4x base, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Run `cycle` until it stops failing with a stale write.
///
/// `cycle` must re-read everything it decides on, since each retry starts
/// from whatever the competing writer stored. Other errors end the loop.
pub fn retry_on_conflict<T>(
    policy: &RetryPolicy,
    user: &UserId,
    mut cycle: impl FnMut() -> Result<T, StoreError>,
) -> Result<T, TrackerError> {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match cycle() {
            Ok(value) => return Ok(value),
            Err(StoreError::StaleWriteConflict { .. }) if attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                debug!(
                    "[growquest:tracker] Stale write for {} (attempt {}/{}), retrying in {:?}",
                    user, attempt, max_attempts, delay
                );
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            Err(StoreError::StaleWriteConflict { .. }) => break,
            Err(e) => return Err(e.into()),
        }
    }

    warn!(
        "[growquest:tracker] Giving up on {} after {} conflicting writes",
        user, max_attempts
    );
    Err(TrackerError::RetriesExhausted {
        user_id: user.to_string(),
        attempts: max_attempts,
    })
}

/// Apply `delta` for `user`, re-reading and re-applying on every stale write.
///
/// Each attempt loads a fresh state, so a retried delta is applied exactly
/// once on top of whatever the competing writer stored.
pub fn apply_with_retry<S: ProgressionStore + ?Sized>(
    store: &S,
    engine: &ProgressionEngine,
    policy: &RetryPolicy,
    user: &UserId,
    delta: XpDelta,
    today: NaiveDate,
    reason: &str,
) -> Result<ProgressionOutcome, TrackerError> {
    retry_on_conflict(policy, user, || {
        let current = store.load_progression_state(user)?;
        let outcome = engine.apply(&current.value, delta, today, reason);
        store.save_progression_state(user, current.version, &outcome.state)?;
        Ok(outcome)
    })
}
