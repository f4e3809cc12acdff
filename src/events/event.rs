//! # What the runtime announces.
//!
//! Every notable moment in the device's life is published as an [`Event`]:
//! - **Cycle lifecycle**: runtime starting, up, faulted, restart scheduled, stopped
//! - **Bring-up progress**: one event per completed stage
//! - **Task lifecycle**: task starting, stopped, faulted
//! - **Link & input**: connect/disconnect, inbound messages, button presses
//! - **Housekeeping**: ticks, clock sync results, shutdown, teardown anomalies
//!
//! An event is an [`EventKind`] plus optional metadata; each kind documents
//! the fields it fills in. Events also carry a process-wide sequence number,
//! so a subscriber that buffers or merges streams can sort by `seq` to
//! recover publish order.
//!
//! ## Example
//! ```rust
//! use panelvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RuntimeFaulted)
//!     .with_reason("i/o fault: socket reset")
//!     .with_attempt(3);
//!
//! assert_eq!(ev.kind, EventKind::RuntimeFaulted);
//! assert_eq!(ev.reason.as_deref(), Some("i/o fault: socket reset"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::error::BringupStage;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Startup ===
    /// Configuration summary, published once before the first cycle.
    ///
    /// Sets:
    /// - `reason`: one-line config summary
    ConfigLoaded,

    // === Cycle lifecycle ===
    /// A bring-up attempt is starting.
    ///
    /// Sets:
    /// - `attempt`: cycle number (1-based, monotonic across restarts)
    RuntimeStarting,

    /// A bring-up stage completed.
    ///
    /// Sets:
    /// - `stage`: the completed [`BringupStage`]
    BringupStage,

    /// Bring-up finished; tasks are about to spawn.
    ///
    /// Sets:
    /// - `task`: device identity (hex)
    /// - `attempt`: cycle number
    RuntimeUp,

    /// The cycle ended with a fault; a restart follows.
    ///
    /// Sets:
    /// - `reason`: fault message
    /// - `attempt`: cycle number
    RuntimeFaulted,

    /// The next bring-up attempt has been scheduled.
    ///
    /// Sets:
    /// - `delay_ms`: pause before the next attempt (ms)
    /// - `attempt`: the cycle number that just failed
    RestartScheduled,

    /// The runtime stopped for good (shutdown requested, teardown clean).
    RuntimeStopped,

    // === Task lifecycle ===
    /// A per-cycle task is starting.
    ///
    /// Sets:
    /// - `task`: task name
    TaskStarting,

    /// A per-cycle task stopped during teardown.
    ///
    /// Sets:
    /// - `task`: task name
    TaskStopped,

    /// A per-cycle task raised a fault (escalates to `RuntimeFaulted`).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: fault message
    TaskFaulted,

    // === Housekeeping ===
    /// One maintenance tick completed.
    Tick,

    /// Wall clock synced from network time.
    ///
    /// Sets:
    /// - `reason`: the applied timestamp
    ClockSynced,

    /// Network time sync failed; ignored, retried next interval.
    ///
    /// Sets:
    /// - `reason`: failure message
    ClockSyncFailed,

    // === Input ===
    /// A button pressed edge was observed.
    ///
    /// Sets:
    /// - `key`: logical button id
    ButtonPressed,

    // === Link ===
    /// Messaging link reported connected.
    ///
    /// Sets:
    /// - `reason`: connect return code / session flags
    LinkConnected,

    /// Messaging link reported disconnected.
    ///
    /// Sets:
    /// - `reason`: disconnect return code
    LinkDisconnected,

    /// An inbound message arrived while connected.
    ///
    /// Sets:
    /// - `topic`: message topic
    /// - `payload`: message bytes
    LinkMessage,

    /// An inbound message arrived while **not** connected and was dropped.
    ///
    /// Sets:
    /// - `topic`: message topic
    LinkMessageDropped,

    // === Shutdown & teardown ===
    /// Shutdown requested (OS signal observed or external cancel).
    ShutdownRequested,

    /// Teardown grace period exceeded; stuck tasks were aborted.
    ///
    /// Sets:
    /// - `reason`: stuck task names
    GraceExceeded,

    /// A discarded cycle's state was still referenced at teardown.
    ///
    /// Sets:
    /// - `reason`: diagnostic detail
    StateRetained,
}

/// One announcement from the runtime.
///
/// `seq`, `at`, and `kind` are always present; the rest is filled in per
/// kind, as documented on [`EventKind`].
#[derive(Clone)]
pub struct Event {
    /// Process-wide publish order; later events compare greater.
    pub seq: u64,
    /// Wall-clock time of publication.
    pub at: SystemTime,

    /// What happened.
    pub kind: EventKind,
    /// Name of the task or identity string, if applicable.
    pub task: Option<Arc<str>>,
    /// Bring-up stage, for [`EventKind::BringupStage`].
    pub stage: Option<BringupStage>,
    /// Human-readable reason (errors, codes, summaries).
    pub reason: Option<Arc<str>>,
    /// Message topic, for link events.
    pub topic: Option<Arc<str>>,
    /// Message payload, for link events.
    pub payload: Option<Arc<[u8]>>,
    /// Logical button id, for input events.
    pub key: Option<u8>,
    /// Cycle number (starting from 1).
    pub attempt: Option<u32>,
    /// Restart delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
}

impl Event {
    /// Stamps a fresh event with the next sequence number and current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            stage: None,
            reason: None,
            topic: None,
            payload: None,
            key: None,
            attempt: None,
            delay_ms: None,
        }
    }

    /// Attaches a task name or identity string.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a bring-up stage.
    #[inline]
    pub fn with_stage(mut self, stage: BringupStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Attaches a short explanation (error text, codes, summaries).
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a message topic.
    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Attaches message payload bytes.
    #[inline]
    pub fn with_payload(mut self, payload: impl Into<Arc<[u8]>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Attaches a logical button id.
    #[inline]
    pub fn with_key(mut self, key: u8) -> Self {
        self.key = Some(key);
        self
    }

    /// Attaches a cycle number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a restart delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::Tick);
        let b = Event::new(EventKind::Tick);
        let c = Event::new(EventKind::Tick);
        assert!(a.seq < b.seq && b.seq < c.seq);
    }

    #[test]
    fn builders_set_only_their_field() {
        let ev = Event::new(EventKind::LinkMessage)
            .with_topic("matrixportal/246f28ab/cmd")
            .with_payload(vec![1u8, 2, 3]);
        assert_eq!(ev.topic.as_deref(), Some("matrixportal/246f28ab/cmd"));
        assert_eq!(ev.payload.as_deref(), Some(&[1u8, 2, 3][..]));
        assert!(ev.task.is_none());
        assert!(ev.key.is_none());
    }

    #[test]
    fn delay_is_saturated_to_u32_millis() {
        let ev = Event::new(EventKind::RestartScheduled)
            .with_delay(Duration::from_secs(u64::MAX / 1_000_000));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
