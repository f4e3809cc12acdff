//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by bring-up, the per-cycle
//! tasks, the link monitor, and the supervisor.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `bring_up`, `InputPoller`, `LinkPump`, `LinkMonitor`,
//!   `Ticker`, `Supervisor`.
//! - **Consumer**: `Supervisor::subscriber_listener()` (fans out to
//!   `SubscriberSet`).
//!
//! See `core/mod.rs` for the system-level wiring diagram.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
