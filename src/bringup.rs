//! # Ordered hardware bring-up.
//!
//! One call takes the board from cold to a complete [`RunState`], in the
//! dependency order the hardware demands:
//!
//! ```text
//! display ─► sensor ─► orientation ─► network ─► identity ─► clock* ─► messaging
//!                                                            (*config-gated)
//! ```
//!
//! Every stage publishes a [`EventKind::BringupStage`] event on completion.
//! The first failure wins: it comes back as a [`BringupError`] naming the
//! stage, nothing after it runs, and the caller discards whatever was built.
//! There is no partial recovery and no internal retry.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{BringupError, BringupStage};
use crate::events::{Bus, Event, EventKind};
use crate::hal::{Board, Layer, Rotation, WallTime};
use crate::identity::DeviceId;
use crate::link::{LinkEvents, LinkMonitor};
use crate::state::RunState;

/// Runs bring-up to completion, or fails at the first broken stage.
///
/// The board outlives the call; the returned [`RunState`] holds the session
/// objects created here. `monitor` becomes the new client's event handler
/// and is flipped to `Connecting` just before the broker handshake.
pub(crate) fn bring_up(
    board: &mut Board,
    cfg: &Config,
    bus: &Bus,
    monitor: &Arc<LinkMonitor>,
) -> Result<RunState, BringupError> {
    let stage_done = |stage: BringupStage| {
        bus.publish(Event::new(EventKind::BringupStage).with_stage(stage));
    };

    // Display
    let display = board
        .matrix
        .configure(&cfg.matrix)
        .map_err(BringupError::at(BringupStage::Display))?;
    stage_done(BringupStage::Display);

    // Sensor: the first post-power-on reading is unreliable, take and drop it
    let sensor = board
        .sensor
        .begin()
        .map_err(BringupError::at(BringupStage::Sensor))?;
    let _ = board
        .sensor
        .read()
        .map_err(BringupError::at(BringupStage::Sensor))?;
    stage_done(BringupStage::Sensor);

    // Orientation: fresh reading, snap to a quarter turn, blank the panel
    let reading = board
        .sensor
        .read()
        .map_err(BringupError::at(BringupStage::Orientation))?;
    let rotation = Rotation::from_acceleration(reading);
    board
        .matrix
        .set_rotation(&display, rotation)
        .map_err(BringupError::at(BringupStage::Orientation))?;
    board
        .matrix
        .show(&display, Layer::empty())
        .map_err(BringupError::at(BringupStage::Orientation))?;
    board.maintenance.compact();
    stage_done(BringupStage::Orientation);

    // Network
    board
        .network
        .connect()
        .map_err(BringupError::at(BringupStage::Network))?;
    stage_done(BringupStage::Network);

    // Identity
    let address = board
        .network
        .hardware_address()
        .map_err(BringupError::at(BringupStage::Identity))?;
    let identity = DeviceId::from_hardware_address(address);
    board.maintenance.compact();
    stage_done(BringupStage::Identity);

    // Clock, only when network time is enabled
    if cfg.ntp.enable {
        let timestamp = board
            .network
            .network_time()
            .map_err(BringupError::at(BringupStage::Clock))?;
        let time = WallTime::parse(&timestamp).map_err(BringupError::at(BringupStage::Clock))?;
        board
            .clock
            .set_time(time)
            .map_err(BringupError::at(BringupStage::Clock))?;
        stage_done(BringupStage::Clock);
    }

    // Messaging
    monitor.mark_connecting();
    let events: Arc<dyn LinkEvents> = Arc::clone(monitor) as Arc<dyn LinkEvents>;
    let mut client = board
        .link
        .open(&cfg.link, events)
        .map_err(BringupError::at(BringupStage::Messaging))?;
    client
        .connect()
        .map_err(BringupError::at(BringupStage::Messaging))?;
    board.maintenance.compact();
    stage_done(BringupStage::Messaging);

    Ok(RunState {
        identity,
        rotation,
        display,
        sensor,
        client: Mutex::new(client),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::stub::{stub_board, StubOptions};
    use crate::hal::Acceleration;

    fn harness() -> (Config, Bus, Arc<LinkMonitor>) {
        let cfg = Config::default();
        let bus = Bus::new(64);
        let monitor = Arc::new(LinkMonitor::new(bus.clone()));
        (cfg, bus, monitor)
    }

    #[tokio::test]
    async fn stages_run_in_dependency_order() {
        let (cfg, bus, monitor) = harness();
        let (mut board, probe) = stub_board(StubOptions::default());

        bring_up(&mut board, &cfg, &bus, &monitor).unwrap();

        let rec = &probe.recorder;
        let configure = rec.position("matrix.configure").unwrap();
        let begin = rec.position("sensor.begin").unwrap();
        let rotate = rec.position("matrix.set_rotation").unwrap();
        let connect = rec.position("network.connect").unwrap();
        let address = rec.position("network.hardware_address").unwrap();
        let open = rec.position("link.open").unwrap();
        let broker = rec.position("link.connect").unwrap();

        assert!(configure < begin, "{:?}", rec.entries());
        assert!(begin < rotate, "{:?}", rec.entries());
        assert!(rotate < connect, "{:?}", rec.entries());
        assert!(connect < address, "{:?}", rec.entries());
        assert!(address < open, "{:?}", rec.entries());
        assert!(open < broker, "{:?}", rec.entries());
    }

    #[tokio::test]
    async fn warm_up_reading_is_discarded() {
        let (cfg, bus, monitor) = harness();
        // first (warm-up) reading points sideways; the real one points up
        let (mut board, probe) = stub_board(StubOptions {
            readings: vec![
                Acceleration { x: 9.8, y: 0.0, z: 0.0 },
                Acceleration { x: 0.0, y: 9.8, z: 0.0 },
            ],
            ..StubOptions::default()
        });

        let state = bring_up(&mut board, &cfg, &bus, &monitor).unwrap();

        assert_eq!(state.rotation, Rotation::Deg0);
        assert_eq!(probe.recorder.count("sensor.read"), 2);
    }

    #[tokio::test]
    async fn repeated_bringup_is_idempotent_with_fresh_sessions() {
        let (cfg, bus, monitor) = harness();
        let (mut board, _probe) = stub_board(StubOptions::default());

        let first = bring_up(&mut board, &cfg, &bus, &monitor).unwrap();
        let second = bring_up(&mut board, &cfg, &bus, &monitor).unwrap();

        assert_eq!(first.rotation, second.rotation);
        assert_eq!(first.identity, second.identity);
        assert_ne!(first.display.instance(), second.display.instance());
        assert_ne!(first.sensor.instance(), second.sensor.instance());
    }

    #[tokio::test]
    async fn failure_names_the_stage_and_stops_there() {
        let (cfg, bus, monitor) = harness();
        let (mut board, probe) = stub_board(StubOptions {
            fail_connect_times: 1,
            ..StubOptions::default()
        });

        let err = bring_up(&mut board, &cfg, &bus, &monitor).unwrap_err();

        assert_eq!(err.stage, BringupStage::Network);
        assert_eq!(probe.recorder.count("link.open"), 0);
        assert_eq!(probe.recorder.count("network.hardware_address"), 0);
    }

    #[tokio::test]
    async fn clock_stage_is_config_gated() {
        let (mut cfg, bus, monitor) = harness();
        let (mut board, probe) = stub_board(StubOptions::default());
        bring_up(&mut board, &cfg, &bus, &monitor).unwrap();
        assert_eq!(probe.recorder.count("clock.set_time"), 0);
        assert_eq!(probe.recorder.count("network.time"), 0);

        cfg.ntp.enable = true;
        let (mut board, probe) = stub_board(StubOptions::default());
        bring_up(&mut board, &cfg, &bus, &monitor).unwrap();
        assert_eq!(probe.recorder.count("clock.set_time"), 1);
        let applied = probe.clock_set.lock().unwrap();
        assert_eq!(applied[0].year, 2021);
        assert_eq!(applied[0].yearday, 309);
    }

    #[tokio::test]
    async fn identity_comes_from_the_hardware_address() {
        let (cfg, bus, monitor) = harness();
        let (mut board, _probe) = stub_board(StubOptions::default());
        let state = bring_up(&mut board, &cfg, &bus, &monitor).unwrap();
        assert_eq!(state.identity.to_string(), "246f28ab");
    }

    #[tokio::test]
    async fn stage_events_are_published_in_order() {
        let (cfg, bus, monitor) = harness();
        let mut rx = bus.subscribe();
        let (mut board, _probe) = stub_board(StubOptions::default());

        bring_up(&mut board, &cfg, &bus, &monitor).unwrap();

        let mut stages = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::BringupStage {
                stages.push(ev.stage.unwrap());
            }
        }
        assert_eq!(
            stages,
            vec![
                BringupStage::Display,
                BringupStage::Sensor,
                BringupStage::Orientation,
                BringupStage::Network,
                BringupStage::Identity,
                BringupStage::Messaging,
            ]
        );
    }

    #[tokio::test]
    async fn compaction_runs_after_the_heavy_stages() {
        let (cfg, bus, monitor) = harness();
        let (mut board, probe) = stub_board(StubOptions::default());
        bring_up(&mut board, &cfg, &bus, &monitor).unwrap();
        assert_eq!(probe.recorder.count("maintenance.compact"), 3);
    }
}
