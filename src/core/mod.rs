//! Runtime core: orchestration and lifecycle.
//!
//! This module contains the embedded implementation of the panelvisor
//! runtime. The only public API from this module is [`Supervisor`], which
//! owns the board, runs bring-up cycles, and handles graceful shutdown.
//!
//! Internal modules:
//! - [`supervisor`]: the restart loop, streak accounting, event fan-out wiring;
//! - [`cycle`]: one bring-up attempt plus its tasks and teardown;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod cycle;
mod shutdown;
mod supervisor;

pub use supervisor::Supervisor;
