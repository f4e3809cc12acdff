//! Demonstrates the crash-and-restart loop with injected faults.
//!
//! ```sh
//! cargo run --example crash_loop
//! ```
//!
//! The stub board refuses the first network association, then fails the 3rd
//! and 7th broker service calls. Watch the restart delay escalate for the
//! bring-up fault and note the fresh broker session on every cycle. The demo
//! stops itself after five seconds.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use panelvisor::hal::stub::{StubButtons, StubOptions, stub_board};
use panelvisor::{
    BackoffPolicy, Config, JitterPolicy, LogWriter, RestartPolicy, Subscribe, Supervisor,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut cfg = Config::default();
    cfg.link.broker = "stub.broker.local".to_string();
    cfg.restart = RestartPolicy::Backoff(BackoffPolicy {
        first: Duration::from_millis(200),
        max: Duration::from_secs(2),
        factor: 2.0,
        jitter: JitterPolicy::None,
    });

    let (board, _probe) = stub_board(StubOptions {
        fail_connect_times: 1,
        fail_service_at: vec![3, 7],
        ..StubOptions::default()
    });

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut sup = Supervisor::new(cfg, board, Box::new(StubButtons::idle()), subs);

    let runtime = CancellationToken::new();
    let stopper = runtime.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        stopper.cancel();
    });

    sup.run_until(runtime).await?;
    Ok(())
}
