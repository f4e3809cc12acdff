//! # Exponential restart pacing.
//!
//! [`BackoffPolicy`] turns a count of consecutive bring-up failures into a
//! wait. Attempt `n` (0-indexed) waits `first × factor^n`, capped at `max`,
//! with jitter applied after the cap. The curve depends only on the attempt
//! number: a jittered (possibly shortened) wait never makes later waits
//! shorter too.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use panelvisor::{BackoffPolicy, JitterPolicy};
//!
//! let pacing = BackoffPolicy {
//!     first: Duration::from_millis(250),
//!     max: Duration::from_secs(8),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(pacing.next(0), Duration::from_millis(250));
//! assert_eq!(pacing.next(2), Duration::from_secs(1));
//! // 250ms × 2^12 would be ~17 minutes; the cap wins.
//! assert_eq!(pacing.next(12), Duration::from_secs(8));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Growth curve for the wait between restart attempts.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Wait after the first failure.
    pub first: Duration,
    /// Ceiling no wait ever exceeds.
    pub max: Duration,
    /// Growth per consecutive failure (`>= 1.0`; `1.0` means a flat wait).
    pub factor: f64,
    /// Randomization applied to the capped wait.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Doubling from 500ms up to 30s, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(500),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Wait before attempt `attempt` (0-indexed), jitter included.
    ///
    /// Overflow, a non-finite product, and anything past [`BackoffPolicy::max`]
    /// all collapse to `max`. Sub-millisecond remainders are dropped.
    pub fn next(&self, attempt: u32) -> Duration {
        self.jitter.apply(self.base(attempt))
    }

    fn base(&self, attempt: u32) -> Duration {
        let cap = self.max.as_millis() as f64;
        let grown = self.first.as_millis() as f64 * self.factor.powf(f64::from(attempt));
        if grown.is_finite() && (0.0..=cap).contains(&grown) {
            Duration::from_millis(grown as u64)
        } else {
            self.max
        }
    }
}
