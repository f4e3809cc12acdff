//! # Orientation sensor capability.
//!
//! [`Accelerometer`] exposes the three-axis reading bring-up uses to pick the
//! display rotation. The first reading after power-on is unreliable on the
//! real part; bring-up takes one warm-up read and throws it away before the
//! reading that matters.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::HalError;

static NEXT_SENSOR_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// One three-axis acceleration reading, in m/s².
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Opaque handle to a powered-up sensor.
///
/// Carries a process-unique instance number so a discarded cycle's sensor is
/// distinguishable from its replacement in logs and tests.
#[derive(Debug)]
pub struct SensorHandle {
    instance: u64,
}

impl SensorHandle {
    /// Allocates a handle with the next instance number.
    ///
    /// Called by driver implementations from [`Accelerometer::begin`].
    pub fn new() -> Self {
        Self {
            instance: NEXT_SENSOR_INSTANCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Process-unique instance number of this handle.
    pub fn instance(&self) -> u64 {
        self.instance
    }
}

impl Default for SensorHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability contract for the accelerometer.
pub trait Accelerometer: Send {
    /// Powers up the sensor and returns a handle to it.
    fn begin(&mut self) -> Result<SensorHandle, HalError>;

    /// Takes one reading.
    fn read(&mut self) -> Result<Acceleration, HalError>;
}
