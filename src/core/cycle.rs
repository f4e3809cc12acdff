//! # Cycle: one bring-up attempt and the session it produces.
//!
//! A [`Cycle`] is the unit the supervisor restarts. It owns nothing durable:
//! the board and the input poller are borrowed from the supervisor, and
//! everything created here (the [`RunState`] with its display, sensor, and
//! broker session) is discarded wholesale when the cycle ends.
//!
//! ## Flow
//! ```text
//! Cycle::run(board, runtime_token)
//!   ├─► bring_up()                      (sync, panic-contained)
//!   │      └─ Err/panic → Fault, no teardown needed
//!   ├─► publish RuntimeUp
//!   ├─► subscribe control topic
//!   ├─► spawn tasks on child tokens:    input-poller, link-pump
//!   └─► drive loop:
//!         ├─ cancelled        → Ok (shutdown)
//!         ├─ task joined      → Fault (tasks only exit on cancel)
//!         └─ tick elapsed     → ticker.tick(board)  (panic-contained)
//!
//! Always after the drive loop:
//!   cancel child tokens → join tasks within grace (abort on overrun)
//!   → reset link monitor → drop RunState (verified sole owner)
//! ```
//!
//! ## Rules
//! - Bring-up and the tick run **inline**: they need `&mut Board`, which never
//!   crosses a task boundary.
//! - A task joining while the cycle is alive is always a fault, even if it
//!   returned `Ok`.
//! - Teardown is unconditional once bring-up succeeds; the fault (if any) is
//!   reported after state is discarded.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::bringup::bring_up;
use crate::config::Config;
use crate::error::Fault;
use crate::events::{Bus, Event, EventKind};
use crate::hal::Board;
use crate::link::LinkMonitor;
use crate::state::RunState;
use crate::tasks::{InputPoller, LinkPump, Task, Ticker};

type TaskSet = JoinSet<(String, Result<(), Fault>)>;

/// One numbered bring-up attempt.
pub(crate) struct Cycle<'a> {
    cfg: &'a Config,
    bus: &'a Bus,
    monitor: &'a Arc<LinkMonitor>,
    poller: &'a Arc<InputPoller>,
    /// 1-based cycle number, monotonic across restarts.
    number: u32,
    /// Names of tasks spawned this cycle that have not joined yet.
    running: Vec<String>,
}

impl<'a> Cycle<'a> {
    pub(crate) fn new(
        cfg: &'a Config,
        bus: &'a Bus,
        monitor: &'a Arc<LinkMonitor>,
        poller: &'a Arc<InputPoller>,
        number: u32,
    ) -> Self {
        Self {
            cfg,
            bus,
            monitor,
            poller,
            number,
            running: Vec::new(),
        }
    }

    /// Runs the cycle until cancellation (`Ok`) or a fault (`Err`).
    ///
    /// On `Ok`, the returned list names tasks that ignored cancellation past
    /// the grace window (empty on a clean stop). On `Err`, teardown has
    /// already completed and the runtime may bring the board up again.
    pub(crate) async fn run(
        mut self,
        board: &mut Board,
        runtime: &CancellationToken,
    ) -> Result<Vec<String>, Fault> {
        let state = match catch_unwind(AssertUnwindSafe(|| {
            bring_up(board, self.cfg, self.bus, self.monitor)
        })) {
            Ok(Ok(state)) => Arc::new(state),
            Ok(Err(err)) => {
                self.monitor.reset();
                return Err(Fault::Bringup(err));
            }
            Err(payload) => {
                self.monitor.reset();
                return Err(Fault::Logic {
                    reason: format!("bring-up panicked: {}", panic_reason(payload.as_ref())),
                });
            }
        };

        self.bus.publish(
            Event::new(EventKind::RuntimeUp)
                .with_task(state.identity.to_string())
                .with_attempt(self.number),
        );

        let cycle = runtime.child_token();
        let mut set = TaskSet::new();
        let verdict = self.drive(board, &state, &cycle, &mut set).await;

        cycle.cancel();
        let stuck = self.teardown(&mut set).await;
        self.monitor.reset();
        discard(state, self.bus);

        verdict.map(|()| stuck)
    }

    /// Subscribes the control topic, spawns the per-cycle tasks, and loops
    /// until cancellation, a task exit, or the next maintenance tick.
    async fn drive(
        &mut self,
        board: &mut Board,
        state: &Arc<RunState>,
        cycle: &CancellationToken,
        set: &mut TaskSet,
    ) -> Result<(), Fault> {
        let topic = state.identity.control_topic(&self.cfg.topic_prefix);
        {
            let mut client = state.client.lock().await;
            client.subscribe(&topic, self.cfg.qos)?;
        }

        let poller: Arc<dyn Task> = self.poller.clone();
        self.spawn_task(set, cycle, poller);
        let pump: Arc<dyn Task> = Arc::new(LinkPump::new(
            Arc::clone(state),
            self.cfg.pump_interval,
            self.cfg.pump_timeout,
        ));
        self.spawn_task(set, cycle, pump);

        let mut ticker = Ticker::new(self.bus.clone(), self.cfg.ntp, self.cfg.tick_interval);

        loop {
            tokio::select! {
                _ = cycle.cancelled() => return Ok(()),
                joined = set.join_next() => {
                    if let Some(Ok((name, _))) = &joined {
                        self.running.retain(|n| n != name);
                    }
                    if cycle.is_cancelled() {
                        return Ok(());
                    }
                    return Err(self.interpret_exit(joined));
                }
                _ = time::sleep(self.cfg.tick_interval) => {
                    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| ticker.tick(board))) {
                        return Err(Fault::Logic {
                            reason: format!(
                                "maintenance tick panicked: {}",
                                panic_reason(payload.as_ref())
                            ),
                        });
                    }
                }
            }
        }
    }

    /// Publishes `TaskStarting` and spawns the task on a child token.
    fn spawn_task(&mut self, set: &mut TaskSet, cycle: &CancellationToken, task: Arc<dyn Task>) {
        let name = task.name().to_string();
        self.bus
            .publish(Event::new(EventKind::TaskStarting).with_task(name.as_str()));
        self.running.push(name);

        let child = cycle.child_token();
        set.spawn(async move {
            let name = task.name().to_string();
            let outcome = task.run(child).await;
            (name, outcome)
        });
    }

    /// Joins the remaining tasks within the grace window.
    ///
    /// Returns the names of tasks still running after the window; those are
    /// aborted and a `GraceExceeded` event is published.
    async fn teardown(&mut self, set: &mut TaskSet) -> Vec<String> {
        let drained = time::timeout(self.cfg.grace, async {
            while let Some(joined) = set.join_next().await {
                if let Ok((name, _)) = joined {
                    self.running.retain(|n| n != &name);
                    self.bus
                        .publish(Event::new(EventKind::TaskStopped).with_task(name));
                }
            }
        })
        .await;

        if drained.is_ok() {
            return Vec::new();
        }

        let stuck = std::mem::take(&mut self.running);
        self.bus
            .publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(", ")));
        set.abort_all();
        stuck
    }

    /// Turns a task exit observed while the cycle is alive into a [`Fault`].
    fn interpret_exit(
        &self,
        joined: Option<Result<(String, Result<(), Fault>), JoinError>>,
    ) -> Fault {
        match joined {
            Some(Ok((name, Err(fault)))) => {
                self.bus.publish(
                    Event::new(EventKind::TaskFaulted)
                        .with_task(name)
                        .with_reason(fault.to_string()),
                );
                fault
            }
            Some(Ok((name, Ok(())))) => Fault::Logic {
                reason: format!("task '{name}' exited before cancellation"),
            },
            Some(Err(join_err)) => join_failure(join_err),
            None => Fault::Logic {
                reason: "task set drained before cancellation".to_string(),
            },
        }
    }
}

/// Drops the cycle's state and verifies nothing else kept a reference.
fn discard(state: Arc<RunState>, bus: &Bus) {
    if Arc::try_unwrap(state).is_err() {
        bus.publish(Event::new(EventKind::StateRetained).with_reason(
            "run state still referenced after teardown; session objects leak until released",
        ));
    }
}

fn join_failure(err: JoinError) -> Fault {
    if err.is_panic() {
        Fault::Logic {
            reason: format!("task panicked: {}", panic_reason(err.into_panic().as_ref())),
        }
    } else {
        Fault::Logic {
            reason: format!("task join failed: {err}"),
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_reason_reads_str_and_string_payloads() {
        let p = catch_unwind(|| panic!("plain message")).unwrap_err();
        assert_eq!(panic_reason(p.as_ref()), "plain message");

        let p = catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(panic_reason(p.as_ref()), "formatted 7");

        let p = catch_unwind(|| std::panic::panic_any(42u8)).unwrap_err();
        assert_eq!(panic_reason(p.as_ref()), "non-string panic payload");
    }

    #[tokio::test]
    async fn panicking_task_becomes_a_logic_fault() {
        let mut set: TaskSet = JoinSet::new();
        set.spawn(async { panic!("task blew up") });

        let joined = set.join_next().await.unwrap();
        let fault = join_failure(joined.unwrap_err());
        assert_eq!(fault.as_label(), "fault_logic");
        assert!(fault.to_string().contains("task blew up"));
    }
}
