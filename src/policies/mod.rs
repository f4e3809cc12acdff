//! Restart pacing policies.
//!
//! This module groups the knobs that control **how long** the supervisor waits
//! between a fault and the next bring-up attempt. Whether to restart is never
//! in question: restarts are unconditional and indefinite.
//!
//! ## Contents
//! - [`RestartPolicy`] immediate retry or escalating delay
//! - [`BackoffPolicy`] how restart delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid thundering herd
//!
//! ## Quick wiring
//! ```text
//! Config { restart: RestartPolicy, .. }
//!      └─► core::Supervisor uses:
//!           - restart.delay_for(streak) after each fault
//!           - streak = consecutive bring-up failures (reset once a cycle is up)
//! ```
//!
//! ## Defaults
//! - `RestartPolicy::Immediate` (the device's historical behavior).
//! - `BackoffPolicy::default()` → first=500ms, factor=2.0, max=30s, jitter=None.
//! - `JitterPolicy::None` by default; consider `Equal` for fleet deployments.

mod backoff;
mod jitter;
mod restart;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use restart::RestartPolicy;
