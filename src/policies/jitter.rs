//! # Randomized restart delays.
//!
//! A power blip can reboot a whole fleet of panels at once; if every unit
//! also waits exactly the same backoff, the broker gets hit by a reconnect
//! wave on every step of the curve. [`JitterPolicy`] spreads those waves out.

use rand::Rng;
use std::time::Duration;

/// How much randomness to mix into a computed restart wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Keep the wait exact. Right for a single bench unit and for tests
    /// that assert on timing.
    None,

    /// Redraw the wait uniformly from `[0, wait]`. Spreads a fleet the
    /// widest, at the cost of occasionally restarting almost instantly.
    Full,

    /// Keep half the wait and redraw the rest from `[0, wait/2]`. Spreads
    /// the fleet while never cutting the wait below half.
    Equal,
}

impl Default for JitterPolicy {
    /// Exact waits unless asked otherwise.
    fn default() -> Self {
        JitterPolicy::None
    }
}

impl JitterPolicy {
    /// Applies this policy to a computed wait.
    pub fn apply(&self, wait: Duration) -> Duration {
        let ms = wait.as_millis() as u64;
        match self {
            JitterPolicy::None => wait,
            JitterPolicy::Full => Duration::from_millis(random_upto(ms)),
            JitterPolicy::Equal => {
                let kept = ms / 2;
                Duration::from_millis(kept + random_upto(ms - kept))
            }
        }
    }
}

fn random_upto(ms: u64) -> u64 {
    if ms == 0 {
        return 0;
    }
    rand::rng().random_range(0..=ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(750);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn full_stays_within_bounds() {
        let d = Duration::from_millis(1000);
        for _ in 0..100 {
            assert!(JitterPolicy::Full.apply(d) <= d);
        }
    }

    #[test]
    fn equal_keeps_at_least_half() {
        let d = Duration::from_millis(1000);
        for _ in 0..100 {
            let out = JitterPolicy::Equal.apply(d);
            assert!(out >= Duration::from_millis(500));
            assert!(out <= d);
        }
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
        assert_eq!(JitterPolicy::Equal.apply(Duration::ZERO), Duration::ZERO);
    }
}
