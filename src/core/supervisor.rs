//! # Supervisor: the crash-and-restart loop around the device runtime.
//!
//! The [`Supervisor`] owns the [`Board`], the event bus, a [`SubscriberSet`],
//! and the long-lived input poller. Its whole job is to bring the board up,
//! keep the per-cycle tasks running, and when **anything** faults, tear the
//! cycle down and bring the board up again. There is no per-task retry: the
//! cycle is the unit of recovery.
//!
//! ## High-level architecture
//! ```text
//! Supervisor::run()
//!   ├─ signal watcher: SIGINT/SIGTERM → ShutdownRequested + cancel
//!   └─ run_until(runtime_token):
//!        ├─ listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!        ├─ publish ConfigLoaded (one-line summary)
//!        └─ loop:
//!             ├─ publish RuntimeStarting(cycle)
//!             ├─ Cycle::run(board)  ── Ok ──► RuntimeStopped, return
//!             │        │
//!             │      Err(fault)
//!             ├─ publish RuntimeFaulted(fault)
//!             ├─ streak: consecutive bring-up failures (runtime faults reset it)
//!             ├─ publish RestartScheduled(delay)     delay = restart.delay_for(streak)
//!             └─ cancellable sleep(delay), next cycle
//! ```
//!
//! ## Event flow
//! ```text
//! bring-up / tasks / monitor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                              ┌─────────┬─────────┐
//!                                                              ▼         ▼         ▼
//!                                                       [queue S1] [queue S2] ... [queue SN]
//!                                                              │         │         │
//!                                                       sub.on_event(&Event) per subscriber
//! ```
//!
//! ## Rules
//! - Restarts continue **indefinitely**; there is no attempt cap.
//! - The cycle number is monotonic across restarts and never resets.
//! - A fault in bring-up extends the restart streak; a fault after the cycle
//!   was up starts a fresh one. [`RestartPolicy::Immediate`] ignores the
//!   streak entirely.
//! - The board survives restarts; per-cycle session objects never do.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use panelvisor::{Config, Supervisor, Subscribe};
//! use panelvisor::hal::stub::{stub_board, StubButtons, StubOptions};
//! #[cfg(feature = "logging")]
//! use panelvisor::LogWriter;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (board, _probe) = stub_board(StubOptions::default());
//!
//!     let mut subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     #[cfg(feature = "logging")]
//!     subs.push(Arc::new(LogWriter::new()));
//!
//!     let mut sup = Supervisor::new(
//!         Config::default(),
//!         board,
//!         Box::new(StubButtons::idle()),
//!         subs,
//!     );
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::cycle::Cycle;
use crate::core::shutdown;
use crate::error::{Fault, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::hal::{Board, InputSource};
use crate::link::LinkMonitor;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::InputPoller;

/// Coordinates bring-up cycles, event delivery, and graceful shutdown.
pub struct Supervisor {
    /// Global runtime configuration.
    pub cfg: Config,
    /// Event bus shared with bring-up, tasks, and the link monitor.
    pub bus: Bus,
    /// Fan-out set for subscribers.
    pub subs: Arc<SubscriberSet>,
    board: Board,
    monitor: Arc<LinkMonitor>,
    poller: Arc<InputPoller>,
}

impl Supervisor {
    /// Creates a new supervisor.
    ///
    /// The `board` is reused across every restart cycle. The `buttons` go to
    /// the input poller, which also outlives cycles (pending edges survive a
    /// restart). Must be called from within a tokio runtime: the subscriber
    /// workers spawn here.
    pub fn new(
        cfg: Config,
        board: Board,
        buttons: Box<dyn InputSource>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(subscribers));
        let monitor = Arc::new(LinkMonitor::new(bus.clone()));
        let poller = Arc::new(InputPoller::new(buttons, bus.clone(), cfg.poll_interval));

        Self {
            cfg,
            bus,
            subs,
            board,
            monitor,
            poller,
        }
    }

    /// Runs until the process receives a termination signal.
    ///
    /// On signal, publishes [`EventKind::ShutdownRequested`] naming the
    /// signal, cancels the runtime, and waits for the current cycle to tear
    /// down within [`Config::grace`].
    pub async fn run(&mut self) -> Result<(), RuntimeError> {
        let runtime = CancellationToken::new();

        let bus = self.bus.clone();
        let stopper = runtime.clone();
        tokio::spawn(async move {
            match shutdown::recv_shutdown_signal().await {
                Ok(signal) => {
                    bus.publish(Event::new(EventKind::ShutdownRequested).with_reason(signal));
                    stopper.cancel();
                }
                Err(e) => eprintln!("[panelvisor] signal listener unavailable: {e}"),
            }
        });

        self.run_until(runtime).await
    }

    /// Runs until the supplied token is cancelled.
    ///
    /// This is [`Supervisor::run`] without the signal watcher, for embedding
    /// the runtime under an external lifecycle (or driving it from tests).
    pub async fn run_until(&mut self, runtime: CancellationToken) -> Result<(), RuntimeError> {
        self.subscriber_listener();
        self.bus
            .publish(Event::new(EventKind::ConfigLoaded).with_reason(self.cfg.summary()));

        let mut cycle_no: u32 = 0;
        let mut streak: u32 = 0;

        loop {
            if runtime.is_cancelled() {
                break;
            }

            cycle_no = cycle_no.saturating_add(1);
            self.bus
                .publish(Event::new(EventKind::RuntimeStarting).with_attempt(cycle_no));

            let cycle = Cycle::new(&self.cfg, &self.bus, &self.monitor, &self.poller, cycle_no);
            let outcome = cycle.run(&mut self.board, &runtime).await;

            match outcome {
                Ok(stuck) => {
                    if stuck.is_empty() {
                        break;
                    }
                    return Err(RuntimeError::GraceExceeded {
                        grace: self.cfg.grace,
                        stuck,
                    });
                }
                Err(fault) => {
                    self.bus.publish(
                        Event::new(EventKind::RuntimeFaulted)
                            .with_attempt(cycle_no)
                            .with_reason(fault.to_string()),
                    );

                    streak = if matches!(fault, Fault::Bringup(_)) {
                        streak.saturating_add(1)
                    } else {
                        0
                    };

                    let delay = self.cfg.restart.delay_for(streak);
                    self.bus.publish(
                        Event::new(EventKind::RestartScheduled)
                            .with_attempt(cycle_no)
                            .with_delay(delay),
                    );

                    if !delay.is_zero() {
                        let sleep = time::sleep(delay);
                        tokio::pin!(sleep);
                        tokio::select! {
                            _ = &mut sleep => {}
                            _ = runtime.cancelled() => {}
                        }
                    }
                }
            }
        }

        self.bus.publish(Event::new(EventKind::RuntimeStopped));
        Ok(())
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// A lagged listener drops the missed events and keeps going; the bus
    /// keeps only `bus_capacity` events for slow readers.
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(missed)) => {
                        eprintln!("[panelvisor] event listener lagged, {missed} events skipped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use tokio::sync::broadcast::Receiver;

    use crate::hal::stub::{PollStep, StubButtons, StubOptions, stub_board};
    use crate::hal::BUTTON_UP;
    use crate::policies::{BackoffPolicy, JitterPolicy, RestartPolicy};

    fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn count(events: &[Event], kind: EventKind) -> usize {
        events.iter().filter(|e| e.kind == kind).count()
    }

    #[tokio::test(start_paused = true)]
    async fn a_service_fault_restarts_the_cycle_with_a_fresh_session() {
        let (board, probe) = stub_board(StubOptions {
            fail_service_at: vec![5],
            ..StubOptions::default()
        });
        let mut sup = Supervisor::new(
            Config::default(),
            board,
            Box::new(StubButtons::idle()),
            Vec::new(),
        );
        let mut rx = sup.bus.subscribe();

        let runtime = CancellationToken::new();
        let stopper = runtime.clone();
        let (outcome, ()) = tokio::join!(sup.run_until(runtime), async move {
            time::sleep(Duration::from_millis(100)).await;
            stopper.cancel();
        });
        assert!(outcome.is_ok());

        let events = drain(&mut rx);
        assert_eq!(count(&events, EventKind::RuntimeUp), 2);
        assert_eq!(count(&events, EventKind::RuntimeFaulted), 1);
        assert_eq!(count(&events, EventKind::TaskFaulted), 1);
        assert_eq!(count(&events, EventKind::RuntimeStopped), 1);

        let delays: Vec<u32> = events
            .iter()
            .filter(|e| e.kind == EventKind::RestartScheduled)
            .map(|e| e.delay_ms.unwrap())
            .collect();
        assert_eq!(delays, vec![0], "immediate restart by default");

        // the replacement cycle got fresh session objects
        assert_eq!(probe.opened.load(Ordering::SeqCst), 2);
        assert_eq!(probe.recorder.count("matrix.configure"), 2);
        assert_eq!(probe.recorder.count("link.close(client 1)"), 1);
        assert_eq!(probe.recorder.count("link.close(client 2)"), 1);
        assert_eq!(
            probe
                .recorder
                .count("link.subscribe(matrixportal/246f28ab/# qos1)"),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn five_consecutive_faults_mean_five_restarts() {
        let (board, probe) = stub_board(StubOptions {
            fail_service_at: vec![1, 2, 3, 4, 5],
            ..StubOptions::default()
        });
        let mut sup = Supervisor::new(
            Config::default(),
            board,
            Box::new(StubButtons::idle()),
            Vec::new(),
        );
        let mut rx = sup.bus.subscribe();

        let runtime = CancellationToken::new();
        let stopper = runtime.clone();
        let (outcome, ()) = tokio::join!(sup.run_until(runtime), async move {
            time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });
        assert!(outcome.is_ok());

        let events = drain(&mut rx);
        assert_eq!(count(&events, EventKind::RuntimeFaulted), 5);
        assert_eq!(count(&events, EventKind::RuntimeStarting), 6);
        assert_eq!(count(&events, EventKind::RuntimeUp), 6);
        assert_eq!(count(&events, EventKind::RuntimeStopped), 1);

        assert_eq!(probe.opened.load(Ordering::SeqCst), 6);
        assert_eq!(probe.recorder.count("link.close"), 6);
        assert!(probe.service_calls.load(Ordering::SeqCst) >= 6);
    }

    #[tokio::test(start_paused = true)]
    async fn bringup_failures_escalate_the_restart_delay() {
        let (board, probe) = stub_board(StubOptions {
            fail_connect_times: 2,
            ..StubOptions::default()
        });
        let mut cfg = Config::default();
        cfg.restart = RestartPolicy::Backoff(BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(10),
            factor: 2.0,
            jitter: JitterPolicy::None,
        });
        let mut sup = Supervisor::new(cfg, board, Box::new(StubButtons::idle()), Vec::new());
        let mut rx = sup.bus.subscribe();

        let runtime = CancellationToken::new();
        let stopper = runtime.clone();
        let (outcome, ()) = tokio::join!(sup.run_until(runtime), async move {
            time::sleep(Duration::from_secs(1)).await;
            stopper.cancel();
        });
        assert!(outcome.is_ok());

        let events = drain(&mut rx);
        let delays: Vec<u32> = events
            .iter()
            .filter(|e| e.kind == EventKind::RestartScheduled)
            .map(|e| e.delay_ms.unwrap())
            .collect();
        assert_eq!(delays, vec![100, 200], "consecutive bring-up faults escalate");

        let faults: Vec<String> = events
            .iter()
            .filter(|e| e.kind == EventKind::RuntimeFaulted)
            .map(|e| e.reason.as_deref().unwrap().to_string())
            .collect();
        assert_eq!(faults.len(), 2);
        assert!(faults[0].contains("network"), "got: {}", faults[0]);

        assert_eq!(count(&events, EventKind::RuntimeUp), 1);
        assert_eq!(probe.recorder.count("network.connect"), 3);
        assert_eq!(probe.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn an_already_cancelled_token_stops_before_any_bringup() {
        let (board, probe) = stub_board(StubOptions::default());
        let mut sup = Supervisor::new(
            Config::default(),
            board,
            Box::new(StubButtons::idle()),
            Vec::new(),
        );
        let mut rx = sup.bus.subscribe();

        let runtime = CancellationToken::new();
        runtime.cancel();
        assert!(sup.run_until(runtime).await.is_ok());

        let events = drain(&mut rx);
        assert_eq!(count(&events, EventKind::RuntimeStarting), 0);
        assert_eq!(count(&events, EventKind::RuntimeStopped), 1);
        assert_eq!(probe.recorder.count("matrix.configure"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn no_session_traffic_until_bringup_has_finished() {
        let (board, probe) = stub_board(StubOptions::default());
        let mut sup = Supervisor::new(
            Config::default(),
            board,
            Box::new(StubButtons::idle()),
            Vec::new(),
        );

        let runtime = CancellationToken::new();
        let stopper = runtime.clone();
        let (outcome, ()) = tokio::join!(sup.run_until(runtime), async move {
            time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });
        assert!(outcome.is_ok());

        // the pump only touches the session once every bring-up stage is done
        let first_service = probe.recorder.position("link.service").unwrap();
        for stage in [
            "matrix.configure",
            "sensor.read",
            "network.connect",
            "link.connect",
            "link.subscribe",
        ] {
            let pos = probe.recorder.position(stage).unwrap();
            assert!(pos < first_service, "{stage} at {pos} >= {first_service}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn button_edges_surface_as_events_while_running() {
        let (board, _probe) = stub_board(StubOptions::default());
        let buttons = StubButtons::scripted([
            PollStep::Idle,
            PollStep::Press(BUTTON_UP),
            PollStep::Release(BUTTON_UP),
        ]);
        let mut sup = Supervisor::new(Config::default(), board, Box::new(buttons), Vec::new());
        let mut rx = sup.bus.subscribe();

        let runtime = CancellationToken::new();
        let stopper = runtime.clone();
        let (outcome, ()) = tokio::join!(sup.run_until(runtime), async move {
            time::sleep(Duration::from_millis(20)).await;
            stopper.cancel();
        });
        assert!(outcome.is_ok());

        let events = drain(&mut rx);
        let pressed: Vec<u8> = events
            .iter()
            .filter(|e| e.kind == EventKind::ButtonPressed)
            .map(|e| e.key.unwrap())
            .collect();
        assert_eq!(pressed, vec![BUTTON_UP], "one event per press, no release");
    }

    #[tokio::test(start_paused = true)]
    async fn inbound_messages_reach_the_bus_while_connected() {
        let (board, probe) = stub_board(StubOptions::default());
        probe.inbox.lock().unwrap().push_back((
            "matrixportal/246f28ab/cmd".to_string(),
            b"rotate".to_vec(),
        ));
        let mut sup = Supervisor::new(
            Config::default(),
            board,
            Box::new(StubButtons::idle()),
            Vec::new(),
        );
        let mut rx = sup.bus.subscribe();

        let runtime = CancellationToken::new();
        let stopper = runtime.clone();
        let (outcome, ()) = tokio::join!(sup.run_until(runtime), async move {
            time::sleep(Duration::from_millis(30)).await;
            stopper.cancel();
        });
        assert!(outcome.is_ok());

        let events = drain(&mut rx);
        assert_eq!(count(&events, EventKind::LinkConnected), 1);
        let msgs: Vec<(String, Vec<u8>)> = events
            .iter()
            .filter(|e| e.kind == EventKind::LinkMessage)
            .map(|e| {
                (
                    e.topic.as_deref().unwrap().to_string(),
                    e.payload.as_deref().unwrap().to_vec(),
                )
            })
            .collect();
        assert_eq!(
            msgs,
            vec![("matrixportal/246f28ab/cmd".to_string(), b"rotate".to_vec())]
        );
    }
}
