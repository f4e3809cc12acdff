//! # panelvisor
//!
//! **Panelvisor** is the supervised runtime for an LED-matrix network display.
//!
//! It owns the whole device lifecycle: ordered hardware bring-up, the
//! cooperative tasks that keep the device responsive (button polling and
//! broker I/O), a once-a-second maintenance tick, and a supervisor that
//! answers every fault the same way the hardware's watchdog would: tear the
//! cycle down and bring the board up again, indefinitely.
//!
//! Hardware comes in through narrow capability traits ([`hal`]); the runtime
//! itself never touches a driver directly, so the same binary logic runs
//! against real peripherals or the in-memory stubs used by tests and demos.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        ┌─────────────┐  ┌──────────────┐  ┌─────────────────┐
//!        │    Board    │  │   buttons    │  │  subscribers    │
//!        │ (hal traits)│  │ (InputSource)│  │ (Subscribe impls)│
//!        └──────┬──────┘  └──────┬───────┘  └────────┬────────┘
//!               ▼                ▼                   ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Supervisor (restart loop)                                      │
//! │  - Bus (broadcast events)                                       │
//! │  - SubscriberSet (fans out to subscribers)                      │
//! │  - LinkMonitor (connection state, message gating)               │
//! │  - InputPoller (outlives cycles, like the buttons it owns)      │
//! └──────────────┬──────────────────────────────────────────────────┘
//!                ▼ per cycle
//!        ┌──────────────────┐
//!        │      Cycle       │  bring_up(): display → sensor → orientation
//!        │  (unit of        │             → network → identity → [clock]
//!        │   recovery)      │             → messaging
//!        └──┬───────────┬───┘
//!           ▼           ▼
//!    ┌────────────┐ ┌──────────┐     inline: maintenance tick (1s)
//!    │input-poller│ │link-pump │
//!    │ (pressed   │ │ (bounded │
//!    │  edges)    │ │  service)│
//!    └──────┬─────┘ └────┬─────┘
//!           │ Events     │ Events
//!           ▼            ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Bus (broadcast channel)                     │
//! └────────────────────────────────┬────────────────────────────────┘
//!                                  ▼
//!                      ┌────────────────────────┐
//!                      │  subscriber_listener   │
//!                      │    (in Supervisor)     │
//!                      └───────────┬────────────┘
//!                                  ▼
//!                            SubscriberSet
//!                          (per-sub queues)
//!                        ┌─────────┼─────────┐
//!                        ▼         ▼         ▼
//!                      worker1  worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Supervisor::run()
//!
//! loop {
//!   ├─► cycle += 1, publish RuntimeStarting{ cycle }
//!   ├─► bring_up(board)                       (sync, panic-contained)
//!   │       │
//!   │       ├─ Err ──► publish RuntimeFaulted ─► streak += 1
//!   │       └─ Ok  ──► publish RuntimeUp{ device, cycle }, streak resets later
//!   ├─► subscribe "{prefix}/{device}/#", spawn input-poller + link-pump
//!   ├─► drive until:
//!   │       ├─ cancelled   ──► join tasks within grace ─► RuntimeStopped, exit
//!   │       ├─ task fault  ──► publish TaskFaulted ─► RuntimeFaulted
//!   │       └─ tick (1s)   ──► compact heap, maybe re-sync clock
//!   ├─► teardown: cancel, join, reset monitor, drop the cycle's RunState
//!   ├─► publish RestartScheduled{ delay = restart.delay_for(streak) }
//!   └─► sleep(delay) (cancellable), continue
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                             | Key types / traits                      |
//! |-------------------|-------------------------------------------------------------------------|------------------------------------------|
//! | **Supervision**   | Crash-and-restart loop; the cycle is the unit of recovery.              | [`Supervisor`]                           |
//! | **Hardware**      | Capability traits for panel, sensor, network, clock, buttons, broker.   | [`hal`], [`link`]                        |
//! | **Identity**      | Device id from the hardware address; control-topic derivation.          | [`DeviceId`]                             |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, custom subscribers).        | [`Subscribe`], [`SubscriberSet`]         |
//! | **Policies**      | Restart pacing between cycles.                                          | [`RestartPolicy`], [`BackoffPolicy`]     |
//! | **Errors**        | Typed errors for drivers, bring-up stages, and runtime faults.          | [`HalError`], [`BringupError`], [`Fault`]|
//! | **Configuration** | Centralized runtime settings.                                           | [`Config`]                               |
//!
//! ## Optional features
//! - `logging`: ships [`LogWriter`], a stdout subscriber for bench runs and
//!   as a starting point for real integrations. On by default.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use panelvisor::{Config, Subscribe, Supervisor};
//! use panelvisor::hal::stub::{stub_board, StubButtons, StubOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.link.broker = "broker.local".to_string();
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = {
//!         use panelvisor::LogWriter;
//!         vec![Arc::new(LogWriter::new())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     // A real deployment hands over its driver implementations here.
//!     let (board, _probe) = stub_board(StubOptions::default());
//!
//!     let mut sup = Supervisor::new(cfg, board, Box::new(StubButtons::idle()), subs);
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```
mod bringup;
mod config;
mod core;
mod error;
mod events;
pub mod hal;
mod identity;
pub mod link;
mod policies;
mod state;
mod subscribers;
mod tasks;

// Flat re-exports: everything an embedder needs lives at the crate root.

pub use config::{Config, NtpOptions};
pub use core::Supervisor;
pub use error::{BringupError, BringupStage, Fault, HalError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use identity::DeviceId;
pub use policies::{BackoffPolicy, JitterPolicy, RestartPolicy};
pub use state::RunState;
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{InputPoller, LinkPump, Task};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
