//! # Button polling task.
//!
//! [`InputPoller`] checks the debounced input source once per interval and
//! publishes a [`EventKind::ButtonPressed`] event for every pressed edge.
//! Released edges are polled and discarded. One poller instance outlives all
//! runtime cycles; only its `run` future is per-cycle.
//!
//! ## Pass shape
//! ```text
//! loop {
//!   ├─ cancelled? → exit Ok
//!   ├─ poll_event()
//!   │    ├─ Ok(None)              → nothing pending
//!   │    ├─ Ok(pressed edge)      → publish ButtonPressed
//!   │    ├─ Ok(released edge)     → discard
//!   │    └─ Err(hal)              → escalate as Fault::Io
//!   └─ sleep(poll_interval)       (cancellable)
//! }
//! ```

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::Fault;
use crate::events::{Bus, Event, EventKind};
use crate::hal::InputSource;
use crate::tasks::Task;

/// Polls the debounced buttons and announces pressed edges.
pub struct InputPoller {
    // std mutex: the lock is held only across the synchronous poll, never
    // across an await
    buttons: Mutex<Box<dyn InputSource>>,
    bus: Bus,
    interval: Duration,
}

impl InputPoller {
    pub(crate) fn new(buttons: Box<dyn InputSource>, bus: Bus, interval: Duration) -> Self {
        Self {
            buttons: Mutex::new(buttons),
            bus,
            interval,
        }
    }

    /// One poll pass: at most one pending edge, pressed edges only.
    fn pass(&self) -> Result<(), Fault> {
        let mut buttons = self.buttons.lock().map_err(|_| Fault::Logic {
            reason: "input source lock poisoned".to_string(),
        })?;
        if let Some(event) = buttons.poll_event()? {
            if event.pressed {
                self.bus
                    .publish(Event::new(EventKind::ButtonPressed).with_key(event.key));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Task for InputPoller {
    fn name(&self) -> &str {
        "input-poller"
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), Fault> {
        loop {
            if ctx.is_cancelled() {
                return Ok(());
            }
            self.pass()?;
            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = ctx.cancelled() => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::stub::{PollStep, StubButtons};
    use std::sync::Arc;

    fn poller(steps: Vec<PollStep>, bus: &Bus) -> Arc<InputPoller> {
        Arc::new(InputPoller::new(
            Box::new(StubButtons::scripted(steps)),
            bus.clone(),
            Duration::from_millis(1),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn one_press_produces_exactly_one_event() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let poller = poller(
            vec![
                PollStep::Idle,
                PollStep::Press(0),
                PollStep::Release(0),
                PollStep::Idle,
            ],
            &bus,
        );

        let ctx = CancellationToken::new();
        let handle = tokio::spawn({
            let poller = Arc::clone(&poller);
            let ctx = ctx.clone();
            async move { poller.run(ctx).await }
        });

        // four scripted steps at 1ms per pass; give it room
        time::sleep(Duration::from_millis(20)).await;
        ctx.cancel();
        handle.await.unwrap().unwrap();

        let mut pressed = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::ButtonPressed {
                pressed.push(ev.key.unwrap());
            }
        }
        assert_eq!(pressed, vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_failure_escalates_as_io_fault() {
        let bus = Bus::new(64);
        let poller = poller(vec![PollStep::Fail], &bus);

        let ctx = CancellationToken::new();
        let fault = poller.run(ctx).await.unwrap_err();
        assert_eq!(fault.as_label(), "fault_io");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop_cleanly() {
        let bus = Bus::new(64);
        let poller = poller(vec![], &bus);

        let ctx = CancellationToken::new();
        let handle = tokio::spawn({
            let poller = Arc::clone(&poller);
            let ctx = ctx.clone();
            async move { poller.run(ctx).await }
        });

        time::sleep(Duration::from_millis(5)).await;
        ctx.cancel();
        assert!(handle.await.unwrap().is_ok());
    }
}
