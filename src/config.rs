//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the device runtime, plus the
//! [`NtpOptions`] sub-struct for network-time sync.
//!
//! There is no file loading here: the host process builds a `Config` from its
//! own secrets store and hands it to `Supervisor::new`. The config is
//! read-only after that; every restart cycle sees the same values.

use std::time::Duration;

use crate::hal::MatrixOptions;
use crate::link::{LinkOptions, QoS};
use crate::policies::RestartPolicy;

/// Network-time sync options.
#[derive(Clone, Copy, Debug)]
pub struct NtpOptions {
    /// Whether to sync the RTC from network time at bring-up and on the
    /// tick's re-sync schedule.
    pub enable: bool,
    /// How often the tick re-syncs the clock.
    pub interval: Duration,
}

impl Default for NtpOptions {
    /// Disabled, hourly when enabled.
    fn default() -> Self {
        Self {
            enable: false,
            interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Global configuration for the device runtime.
///
/// Defines:
/// - **Hardware geometry**: matrix dimensions and color handling
/// - **Link settings**: broker endpoint, topic namespace, QoS
/// - **Cadences**: poll / pump / tick intervals and the pump's I/O timeout
/// - **Supervision**: restart pacing, teardown grace, bus capacity
///
/// ## Field semantics
/// - `poll_interval`: yield between button polls (the buttons are checked at
///   most once per interval)
/// - `pump_interval`: suspend between link service passes; together with
///   `pump_timeout` this bounds each pass and must stay well under the
///   broker keep-alive
/// - `tick_interval`: cadence of the maintenance tick
/// - `grace`: maximum wait for tasks to stop at teardown before aborting
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Verbose logging (per-tick and per-message records).
    pub debug: bool,

    /// Matrix geometry and panel wiring.
    pub matrix: MatrixOptions,

    /// Broker endpoint and credentials.
    pub link: LinkOptions,

    /// First topic segment; the control channel is
    /// `{topic_prefix}/{device_id}/#`.
    pub topic_prefix: String,

    /// QoS requested for the control-channel subscription.
    pub qos: QoS,

    /// Network-time sync.
    pub ntp: NtpOptions,

    /// Yield between button polls.
    pub poll_interval: Duration,

    /// Suspend between link service passes.
    pub pump_interval: Duration,

    /// Bound on one link service pass.
    pub pump_timeout: Duration,

    /// Cadence of the maintenance tick.
    pub tick_interval: Duration,

    /// Maximum time to wait for tasks to stop at teardown before aborting.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// receive `Lagged` and skip older items. Minimum value is 1 (enforced
    /// by Bus).
    pub bus_capacity: usize,

    /// Pacing between a fault and the next bring-up attempt.
    pub restart: RestartPolicy,
}

impl Config {
    /// One-line summary for the startup announcement.
    pub fn summary(&self) -> String {
        format!(
            "debug={} ntp_enable={} ntp_interval={:?} prefix={} matrix={}x{}x{} order={} broker={}:{}",
            self.debug,
            self.ntp.enable,
            self.ntp.interval,
            self.topic_prefix,
            self.matrix.width,
            self.matrix.height,
            self.matrix.bit_depth,
            self.matrix.color_order,
            self.link.broker,
            self.link.port,
        )
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `debug = false`
    /// - `matrix = 64×32, 6-bit, RGB`
    /// - `topic_prefix = "matrixportal"`, `qos = AtLeastOnce`
    /// - `ntp` disabled, hourly when enabled
    /// - `poll_interval = 1ms`, `pump_interval = 10ms`, `pump_timeout = 10ms`
    /// - `tick_interval = 1s`
    /// - `grace = 5s`, `bus_capacity = 256`
    /// - `restart = RestartPolicy::Immediate`
    fn default() -> Self {
        Self {
            debug: false,
            matrix: MatrixOptions::default(),
            link: LinkOptions::default(),
            topic_prefix: "matrixportal".to_string(),
            qos: QoS::AtLeastOnce,
            ntp: NtpOptions::default(),
            poll_interval: Duration::from_millis(1),
            pump_interval: Duration::from_millis(10),
            pump_timeout: Duration::from_millis(10),
            tick_interval: Duration::from_secs(1),
            grace: Duration::from_secs(5),
            bus_capacity: 256,
            restart: RestartPolicy::default(),
        }
    }
}
