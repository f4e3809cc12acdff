//! # The runtime's cooperative activities.
//!
//! This module provides the task trait and the three activities every cycle
//! runs:
//! - [`Task`] - trait for implementing async cancelable tasks
//! - [`InputPoller`] - polls the buttons, announces pressed edges
//! - [`LinkPump`] - services the broker client, one bounded unit per pass
//! - [`Ticker`] - periodic maintenance, driven inline by the supervisor
//!
//! The poller and pump are spawned into the cycle's `JoinSet`; the ticker is
//! not a [`Task`] because it needs the board mutably.

mod input;
mod pump;
mod task;
mod tick;

pub use input::InputPoller;
pub use pump::LinkPump;
pub use task::Task;
pub(crate) use tick::Ticker;
