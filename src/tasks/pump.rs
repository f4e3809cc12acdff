//! # Link servicing task.
//!
//! [`LinkPump`] gives the broker client its network slot: one bounded
//! `service` call per pass, then a suspend. Keep-alive, outbound flushes and
//! inbound dispatch all happen inside that call; the registered
//! [`LinkEvents`](crate::link::LinkEvents) callbacks fire synchronously from
//! it. A failed pass escalates and restarts the runtime; the pump never
//! reconnects on its own.
//!
//! The pump holds the cycle's [`RunState`] clone, so each restart builds a
//! new pump around the new client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::Fault;
use crate::state::RunState;
use crate::tasks::Task;

/// Drives the broker client's I/O, one bounded unit per pass.
pub struct LinkPump {
    state: Arc<RunState>,
    interval: Duration,
    timeout: Duration,
}

impl LinkPump {
    pub(crate) fn new(state: Arc<RunState>, interval: Duration, timeout: Duration) -> Self {
        Self {
            state,
            interval,
            timeout,
        }
    }
}

#[async_trait]
impl Task for LinkPump {
    fn name(&self) -> &str {
        "link-pump"
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), Fault> {
        loop {
            if ctx.is_cancelled() {
                return Ok(());
            }
            {
                let mut client = self.state.client.lock().await;
                client.service(self.timeout)?;
            }
            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = ctx.cancelled() => return Ok(()),
            }
        }
    }
}
