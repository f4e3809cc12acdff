//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [starting] cycle=1
//! [bringup] stage=display
//! [up] device=246f28ab cycle=1
//! [button] key=0
//! [faulted] cycle=1 err="i/o fault: socket reset"
//! [restart] cycle=1 delay=0ms
//! [shutdown-requested]
//! [stopped]
//! ```
//!
//! Chatty events (`Tick`, `LinkMessage`) are suppressed unless the writer is
//! constructed with [`LogWriter::verbose`].
//!
//! ## Example
//! ```no_run
//! # use panelvisor::LogWriter;
//! let quiet = LogWriter::new();
//! let chatty = LogWriter::verbose();
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event descriptions
/// to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter {
    verbose: bool,
}

impl LogWriter {
    /// Quiet writer: suppresses per-tick and per-message chatter.
    #[must_use]
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Verbose writer: prints every event, including ticks and messages.
    #[must_use]
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::ConfigLoaded => {
                println!("[config] {reason}");
            }
            EventKind::RuntimeStarting => {
                if let Some(cycle) = e.attempt {
                    println!("[starting] cycle={cycle}");
                }
            }
            EventKind::BringupStage => {
                if let Some(stage) = e.stage {
                    println!("[bringup] stage={stage}");
                }
            }
            EventKind::RuntimeUp => {
                let device = e.task.as_deref().unwrap_or("?");
                println!("[up] device={device} cycle={:?}", e.attempt);
            }
            EventKind::RuntimeFaulted => {
                println!("[faulted] cycle={:?} err={reason:?}", e.attempt);
            }
            EventKind::RestartScheduled => {
                println!(
                    "[restart] cycle={:?} delay={}ms",
                    e.attempt,
                    e.delay_ms.unwrap_or(0)
                );
            }
            EventKind::RuntimeStopped => {
                println!("[stopped]");
            }
            EventKind::TaskStarting => {
                println!("[task-starting] task={:?}", e.task);
            }
            EventKind::TaskStopped => {
                println!("[task-stopped] task={:?}", e.task);
            }
            EventKind::TaskFaulted => {
                println!("[task-faulted] task={:?} err={reason:?}", e.task);
            }
            EventKind::Tick => {
                if self.verbose {
                    println!("[tick]");
                }
            }
            EventKind::ClockSynced => {
                println!("[clock-synced] at={reason:?}");
            }
            EventKind::ClockSyncFailed => {
                println!("[clock-sync-failed] err={reason:?}");
            }
            EventKind::ButtonPressed => {
                if let Some(key) = e.key {
                    println!("[button] key={key}");
                }
            }
            EventKind::LinkConnected => {
                println!("[link-connected] {reason}");
            }
            EventKind::LinkDisconnected => {
                println!("[link-disconnected] {reason}");
            }
            EventKind::LinkMessage => {
                if self.verbose {
                    let topic = e.topic.as_deref().unwrap_or("?");
                    let len = e.payload.as_deref().map_or(0, <[u8]>::len);
                    println!("[message] topic={topic} len={len}");
                }
            }
            EventKind::LinkMessageDropped => {
                println!("[message-dropped] topic={:?}", e.topic);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested] signal={reason}");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded] stuck={reason}");
            }
            EventKind::StateRetained => {
                println!("[state-retained] {reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
