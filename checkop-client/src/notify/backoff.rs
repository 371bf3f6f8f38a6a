//! Reconnection backoff policy
//!
//! Bounded exponential backoff: 1s base doubling per failed attempt, capped
//! at 30s, giving up after 5 consecutive failures. The give-up is silent by
//! design; the hosting application is expected to restart the channel on
//! session boundaries (page reload equivalent).

use std::time::Duration;

/// Base delay before the first reconnection attempt.
const BASE_DELAY: Duration = Duration::from_secs(1);
/// Upper bound for any single delay.
const MAX_DELAY: Duration = Duration::from_secs(30);
/// Consecutive failures tolerated before giving up.
const MAX_ATTEMPTS: u32 = 5;

/// Tracks consecutive connection failures and yields the next delay.
#[derive(Debug, Default)]
pub struct ReconnectPolicy {
    attempt: u32,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the failure counter after a successful open.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Delay to wait before the next attempt, or `None` once the attempt
    /// budget is exhausted (no further reconnection is scheduled).
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= MAX_ATTEMPTS {
            return None;
        }
        let delay = delay_for_attempt(self.attempt);
        self.attempt += 1;
        Some(delay)
    }

    /// Consecutive failures seen since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

/// `min(base * 2^attempt, cap)`, saturating for large attempt counts.
fn delay_for_attempt(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let delay = BASE_DELAY
        .checked_mul(factor.min(u32::MAX as u64) as u32)
        .unwrap_or(MAX_DELAY);
    delay.min(MAX_DELAY)
}
