//! # Restart pacing for the whole runtime.
//!
//! Faults always restart the runtime; [`RestartPolicy`] only decides how long
//! to wait before the next bring-up attempt.
//!
//! - [`RestartPolicy::Immediate`] retry with no delay (default; mirrors the
//!   device's historical behavior)
//! - [`RestartPolicy::Backoff`] escalate the delay with consecutive bring-up
//!   failures
//!
//! ## Choosing a policy
//!
//! **Attended bench / development**:
//! ```text
//! RestartPolicy::Immediate      → crash, relaunch, observe
//! ```
//!
//! **Unattended deployment**:
//! ```text
//! RestartPolicy::Backoff(..)    → a dead broker or AP outage does not
//!                                 turn the device into a reconnect hammer
//! ```
//!
//! The failure streak passed to [`RestartPolicy::delay_for`] counts
//! *consecutive bring-up failures*; the supervisor resets it once a cycle
//! makes it past bring-up, so an occasional crash of a long-lived runtime
//! always restarts from the first delay.

use std::time::Duration;

use crate::policies::backoff::BackoffPolicy;

/// Policy controlling the pause between a fault and the next bring-up attempt.
#[derive(Clone, Copy, Debug)]
pub enum RestartPolicy {
    /// Retry at once, unconditionally (default).
    Immediate,
    /// Escalate the delay with consecutive bring-up failures.
    Backoff(BackoffPolicy),
}

impl Default for RestartPolicy {
    /// Returns [`RestartPolicy::Immediate`].
    fn default() -> Self {
        RestartPolicy::Immediate
    }
}

impl RestartPolicy {
    /// Computes the delay before the next attempt for the given failure streak.
    ///
    /// `streak` is 1-based: the first failure of a run of consecutive failures
    /// passes 1. A streak of 0 is treated as 1.
    pub fn delay_for(&self, streak: u32) -> Duration {
        match self {
            RestartPolicy::Immediate => Duration::ZERO,
            RestartPolicy::Backoff(backoff) => backoff.next(streak.saturating_sub(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::JitterPolicy;

    #[test]
    fn immediate_never_waits() {
        let policy = RestartPolicy::Immediate;
        for streak in [0, 1, 2, 100] {
            assert_eq!(policy.delay_for(streak), Duration::ZERO);
        }
    }

    #[test]
    fn backoff_starts_at_first_and_escalates() {
        let policy = RestartPolicy::Backoff(BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        });
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn zero_streak_behaves_like_first_failure() {
        let policy = RestartPolicy::Backoff(BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        });
        assert_eq!(policy.delay_for(0), policy.delay_for(1));
    }
}
