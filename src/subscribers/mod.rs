//! # Event subscribers for the panelvisor runtime.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery that
//! delivers runtime events published on the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                             │
//!                                            (bounded queue + worker per subscriber)
//!                                                │         │          │
//!                                                ▼         ▼          ▼
//!                                            LogWriter  Metrics   Custom ...
//! ```
//!
//! Subscribers never run inline with the supervisor loop: each one gets its
//! own bounded queue and worker, so a slow or panicking subscriber cannot
//! stall bring-up, restarts, or teardown.
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use panelvisor::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct MetricsSubscriber;
//!
//! #[async_trait]
//! impl Subscribe for MetricsSubscriber {
//!     async fn on_event(&self, event: &Event) {
//!         match event.kind {
//!             EventKind::RuntimeFaulted => {
//!                 // increment restart counter
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
