//! Runs the full runtime against the in-memory stub board.
//!
//! ```sh
//! cargo run --example stub_device
//! ```
//!
//! The script presses the UP button a few polls after bring-up and delivers
//! one inbound control message through the stub broker. Press Ctrl-C to stop
//! and watch the graceful teardown.

use std::sync::Arc;

use anyhow::Result;

use panelvisor::hal::stub::{PollStep, StubButtons, StubOptions, stub_board};
use panelvisor::hal::BUTTON_UP;
use panelvisor::{Config, LogWriter, Subscribe, Supervisor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut cfg = Config::default();
    cfg.debug = true;
    cfg.link.broker = "stub.broker.local".to_string();
    cfg.ntp.enable = true;

    let (board, probe) = stub_board(StubOptions::default());
    probe.inbox.lock().unwrap().push_back((
        format!("{}/246f28ab/show", cfg.topic_prefix),
        b"hello panel".to_vec(),
    ));

    let buttons = StubButtons::scripted([
        PollStep::Idle,
        PollStep::Idle,
        PollStep::Press(BUTTON_UP),
        PollStep::Release(BUTTON_UP),
    ]);

    let log = if cfg.debug {
        LogWriter::verbose()
    } else {
        LogWriter::new()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(log)];

    let mut sup = Supervisor::new(cfg, board, Box::new(buttons), subs);
    sup.run().await?;
    Ok(())
}
