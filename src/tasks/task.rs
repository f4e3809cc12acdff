//! # Task abstraction for the per-cycle activities.
//!
//! This module defines the [`Task`] trait (async, cancelable). A task
//! receives the cycle's [`CancellationToken`] and must observe it at every
//! suspension point: teardown is the only way a healthy task ever exits.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Fault;

/// # Asynchronous, cancelable unit of the runtime cycle.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run)
/// method that receives the cycle's [`CancellationToken`].
///
/// ## Contract
/// - `Ok(())` is only returned after observing cancellation; a task that
///   exits on its own is a logic fault and restarts the runtime.
/// - `Err(fault)` escalates: the supervisor tears the whole cycle down.
/// - Implementations check `ctx.is_cancelled()` / select on `ctx.cancelled()`
///   at every suspension point and exit promptly during teardown.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task until cancellation or fault.
    async fn run(&self, ctx: CancellationToken) -> Result<(), Fault>;
}
