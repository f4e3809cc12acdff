//! # In-memory board for tests and demos.
//!
//! Every capability gets a scripted implementation that records what was
//! called into a shared [`Recorder`], so tests can assert call order across
//! subsystems ("no task spawned before `network.connect`"). Failure
//! injection covers the paths the supervisor must survive: network connect
//! refusals, broker connect refusals, and service calls that fail on chosen
//! pass numbers.
//!
//! ## Shape
//! ```text
//! stub_board(StubOptions) ──► (Board, StubProbe)
//!                                      │
//!                                      ├─ recorder: ordered call log
//!                                      ├─ opened / service_calls counters
//!                                      ├─ inbox: messages the next service
//!                                      │         pass delivers
//!                                      └─ clock_set: applied WallTimes
//! ```
//!
//! Counters are global across restarts on purpose: "fail the 5th service
//! call" means the 5th since process start, whichever cycle it lands in.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::HalError;
use crate::hal::clock::{SystemClock, WallTime};
use crate::hal::display::{DisplayHandle, Layer, MatrixDriver, MatrixOptions, Rotation};
use crate::hal::input::{InputSource, KeyEvent};
use crate::hal::maintenance::Maintenance;
use crate::hal::net::{HardwareAddress, NetworkLink};
use crate::hal::sensor::{Acceleration, Accelerometer, SensorHandle};
use crate::hal::Board;
use crate::link::{LinkEvents, LinkFactory, LinkOptions, MessageClient, QoS};

/// Ordered, shared call log.
#[derive(Clone, Default)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// Snapshot of all entries so far.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Index of the first entry that starts with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .position(|e| e.starts_with(prefix))
    }

    /// Number of entries that start with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

/// Knobs for [`stub_board`].
#[derive(Clone, Debug)]
pub struct StubOptions {
    /// Scripted accelerometer readings, consumed one per read (the warm-up
    /// read consumes the first).
    pub readings: Vec<Acceleration>,
    /// Reading returned once the script is exhausted.
    pub fallback: Acceleration,
    /// Hardware address reported by the network stub.
    pub address: [u8; 6],
    /// Timestamp line returned by the network time stub.
    pub network_time: String,
    /// Times `network.connect` fails before succeeding.
    pub fail_connect_times: u32,
    /// Times the broker client's `connect` fails before succeeding.
    pub link_fail_connect_times: u32,
    /// 1-based global `service` call numbers that fail.
    pub fail_service_at: Vec<usize>,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            readings: Vec::new(),
            // gravity along +y: the panel sits upright, rotation 0
            fallback: Acceleration { x: 0.0, y: 9.8, z: 0.0 },
            address: [0x24, 0x6f, 0x28, 0xab, 0x00, 0x01],
            network_time: "2021-11-05 10:24:41.394 309 5 +0000 UTC".to_string(),
            fail_connect_times: 0,
            link_fail_connect_times: 0,
            fail_service_at: Vec::new(),
        }
    }
}

/// Shared handles into a stub board's internals.
#[derive(Clone)]
pub struct StubProbe {
    /// Ordered call log across all stubs.
    pub recorder: Recorder,
    /// Broker clients opened so far.
    pub opened: Arc<AtomicUsize>,
    /// Global `service` calls so far.
    pub service_calls: Arc<AtomicUsize>,
    /// Messages delivered by upcoming `service` passes (topic, payload).
    pub inbox: Arc<Mutex<VecDeque<(String, Vec<u8>)>>>,
    /// Wall times applied to the clock stub.
    pub clock_set: Arc<Mutex<Vec<WallTime>>>,
}

/// Builds a fully stubbed [`Board`] plus the probe observing it.
pub fn stub_board(options: StubOptions) -> (Board, StubProbe) {
    let probe = StubProbe {
        recorder: Recorder::new(),
        opened: Arc::new(AtomicUsize::new(0)),
        service_calls: Arc::new(AtomicUsize::new(0)),
        inbox: Arc::new(Mutex::new(VecDeque::new())),
        clock_set: Arc::new(Mutex::new(Vec::new())),
    };

    let board = Board {
        matrix: Box::new(StubMatrix {
            recorder: probe.recorder.clone(),
        }),
        sensor: Box::new(StubSensor {
            recorder: probe.recorder.clone(),
            script: options.readings.into(),
            fallback: options.fallback,
        }),
        network: Box::new(StubNetwork {
            recorder: probe.recorder.clone(),
            address: HardwareAddress(options.address),
            time: options.network_time,
            fail_connect_left: options.fail_connect_times,
        }),
        clock: Box::new(StubClock {
            recorder: probe.recorder.clone(),
            applied: Arc::clone(&probe.clock_set),
        }),
        link: Box::new(StubLink {
            recorder: probe.recorder.clone(),
            opened: Arc::clone(&probe.opened),
            service_seq: Arc::clone(&probe.service_calls),
            inbox: Arc::clone(&probe.inbox),
            fail_connect_left: Arc::new(AtomicU32::new(options.link_fail_connect_times)),
            fail_service_at: Arc::new(options.fail_service_at),
        }),
        maintenance: Box::new(StubMaintenance {
            recorder: probe.recorder.clone(),
        }),
    };

    (board, probe)
}

pub struct StubMatrix {
    recorder: Recorder,
}

impl MatrixDriver for StubMatrix {
    fn configure(&mut self, options: &MatrixOptions) -> Result<DisplayHandle, HalError> {
        self.recorder.record(format!(
            "matrix.configure({}x{}x{})",
            options.width, options.height, options.bit_depth
        ));
        Ok(DisplayHandle::new())
    }

    fn set_rotation(
        &mut self,
        _display: &DisplayHandle,
        rotation: Rotation,
    ) -> Result<(), HalError> {
        self.recorder
            .record(format!("matrix.set_rotation({})", rotation.degrees()));
        Ok(())
    }

    fn show(&mut self, _display: &DisplayHandle, _root: Layer) -> Result<(), HalError> {
        self.recorder.record("matrix.show");
        Ok(())
    }
}

pub struct StubSensor {
    recorder: Recorder,
    script: VecDeque<Acceleration>,
    fallback: Acceleration,
}

impl Accelerometer for StubSensor {
    fn begin(&mut self) -> Result<SensorHandle, HalError> {
        self.recorder.record("sensor.begin");
        Ok(SensorHandle::new())
    }

    fn read(&mut self) -> Result<Acceleration, HalError> {
        self.recorder.record("sensor.read");
        Ok(self.script.pop_front().unwrap_or(self.fallback))
    }
}

pub struct StubNetwork {
    recorder: Recorder,
    address: HardwareAddress,
    time: String,
    fail_connect_left: u32,
}

impl NetworkLink for StubNetwork {
    fn connect(&mut self) -> Result<(), HalError> {
        self.recorder.record("network.connect");
        if self.fail_connect_left > 0 {
            self.fail_connect_left -= 1;
            return Err(HalError::Io {
                reason: "injected association failure".into(),
            });
        }
        Ok(())
    }

    fn hardware_address(&mut self) -> Result<HardwareAddress, HalError> {
        self.recorder.record("network.hardware_address");
        Ok(self.address)
    }

    fn network_time(&mut self) -> Result<String, HalError> {
        self.recorder.record("network.time");
        Ok(self.time.clone())
    }
}

pub struct StubClock {
    recorder: Recorder,
    applied: Arc<Mutex<Vec<WallTime>>>,
}

impl SystemClock for StubClock {
    fn set_time(&mut self, time: WallTime) -> Result<(), HalError> {
        self.recorder.record("clock.set_time");
        self.applied.lock().unwrap().push(time);
        Ok(())
    }
}

pub struct StubMaintenance {
    recorder: Recorder,
}

impl Maintenance for StubMaintenance {
    fn compact(&mut self) {
        self.recorder.record("maintenance.compact");
    }
}

/// One scripted button poll step.
#[derive(Clone, Copy, Debug)]
pub enum PollStep {
    /// No pending edge.
    Idle,
    /// Pressed edge for the given key.
    Press(u8),
    /// Released edge for the given key.
    Release(u8),
    /// Injected poll failure.
    Fail,
}

/// Scripted button source. Once the script runs out, it stays idle.
pub struct StubButtons {
    script: Mutex<VecDeque<PollStep>>,
}

impl StubButtons {
    pub fn scripted(steps: impl IntoIterator<Item = PollStep>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
        }
    }

    /// A source that never reports an edge.
    pub fn idle() -> Self {
        Self::scripted([])
    }
}

impl InputSource for StubButtons {
    fn poll_event(&mut self) -> Result<Option<KeyEvent>, HalError> {
        match self.script.lock().unwrap().pop_front() {
            None | Some(PollStep::Idle) => Ok(None),
            Some(PollStep::Press(key)) => Ok(Some(KeyEvent { key, pressed: true })),
            Some(PollStep::Release(key)) => Ok(Some(KeyEvent { key, pressed: false })),
            Some(PollStep::Fail) => Err(HalError::Device {
                reason: "injected button failure".into(),
            }),
        }
    }
}

pub struct StubLink {
    recorder: Recorder,
    opened: Arc<AtomicUsize>,
    service_seq: Arc<AtomicUsize>,
    inbox: Arc<Mutex<VecDeque<(String, Vec<u8>)>>>,
    fail_connect_left: Arc<AtomicU32>,
    fail_service_at: Arc<Vec<usize>>,
}

impl LinkFactory for StubLink {
    fn open(
        &mut self,
        options: &LinkOptions,
        events: Arc<dyn LinkEvents>,
    ) -> Result<Box<dyn MessageClient>, HalError> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder
            .record(format!("link.open({}:{})", options.broker, options.port));
        Ok(Box::new(StubClient {
            recorder: self.recorder.clone(),
            events,
            open_index: n,
            service_seq: Arc::clone(&self.service_seq),
            inbox: Arc::clone(&self.inbox),
            fail_connect_left: Arc::clone(&self.fail_connect_left),
            fail_service_at: Arc::clone(&self.fail_service_at),
        }))
    }
}

pub struct StubClient {
    recorder: Recorder,
    events: Arc<dyn LinkEvents>,
    open_index: usize,
    service_seq: Arc<AtomicUsize>,
    inbox: Arc<Mutex<VecDeque<(String, Vec<u8>)>>>,
    fail_connect_left: Arc<AtomicU32>,
    fail_service_at: Arc<Vec<usize>>,
}

impl MessageClient for StubClient {
    fn connect(&mut self) -> Result<(), HalError> {
        self.recorder.record("link.connect");
        if self
            .fail_connect_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
        {
            return Err(HalError::Io {
                reason: "injected broker refusal".into(),
            });
        }
        self.events.on_connect(false, 0);
        Ok(())
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), HalError> {
        self.recorder
            .record(format!("link.subscribe({} qos{})", topic, qos.level()));
        Ok(())
    }

    fn service(&mut self, _timeout: Duration) -> Result<(), HalError> {
        let seq = self.service_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.record("link.service");
        if self.fail_service_at.contains(&seq) {
            return Err(HalError::Io {
                reason: format!("injected failure on service call {seq}"),
            });
        }
        if let Some((topic, payload)) = self.inbox.lock().unwrap().pop_front() {
            self.events.on_message(&topic, &payload);
        }
        Ok(())
    }
}

impl Drop for StubClient {
    fn drop(&mut self) {
        self.recorder
            .record(format!("link.close(client {})", self.open_index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_tracks_order_and_counts() {
        let rec = Recorder::new();
        rec.record("a.first");
        rec.record("b.second");
        rec.record("a.third");
        assert_eq!(rec.position("a."), Some(0));
        assert_eq!(rec.position("b."), Some(1));
        assert_eq!(rec.count("a."), 2);
        assert_eq!(rec.position("missing"), None);
    }

    #[test]
    fn exhausted_button_script_stays_idle() {
        let mut buttons = StubButtons::scripted([PollStep::Press(1)]);
        assert!(matches!(
            buttons.poll_event(),
            Ok(Some(KeyEvent { key: 1, pressed: true }))
        ));
        assert!(matches!(buttons.poll_event(), Ok(None)));
        assert!(matches!(buttons.poll_event(), Ok(None)));
    }

    #[test]
    fn service_failures_land_on_the_scripted_calls() {
        let (board, probe) = stub_board(StubOptions {
            fail_service_at: vec![2],
            ..StubOptions::default()
        });
        let mut link = board.link;
        let events = Arc::new(NullEvents);
        let mut client = link.open(&LinkOptions::default(), events).unwrap();
        assert!(client.service(Duration::from_millis(1)).is_ok());
        assert!(client.service(Duration::from_millis(1)).is_err());
        assert!(client.service(Duration::from_millis(1)).is_ok());
        assert_eq!(probe.service_calls.load(Ordering::SeqCst), 3);
    }

    struct NullEvents;
    impl LinkEvents for NullEvents {
        fn on_connect(&self, _session_present: bool, _code: u8) {}
        fn on_disconnect(&self, _code: u8) {}
        fn on_message(&self, _topic: &str, _payload: &[u8]) {}
    }
}
