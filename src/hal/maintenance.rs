//! # Periodic maintenance capability.
//!
//! The original device reclaims heap after every allocation-heavy phase and
//! once per tick. [`Maintenance`] keeps that duty a board concern: hosted
//! builds make it a no-op, constrained targets plug in whatever reclamation
//! pass they have.

/// Capability contract for periodic housekeeping.
pub trait Maintenance: Send {
    /// Runs one bounded compaction pass. Must not block for long; it runs
    /// inside the tick slot.
    fn compact(&mut self);
}
