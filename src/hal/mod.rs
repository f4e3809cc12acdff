//! Hardware capabilities: one narrow trait per subsystem.
//!
//! The runtime owns no drivers. Everything it touches (panel, sensor, WiFi,
//! RTC, buttons, heap compaction, broker client) comes in through the traits
//! in this module and [`crate::link`], bundled into a [`Board`]. Hosted tests
//! and demos use the in-memory implementations in [`stub`].
//!
//! ## Contents
//! - [`MatrixDriver`], [`MatrixOptions`], [`Rotation`], [`DisplayHandle`], [`Layer`]
//! - [`Accelerometer`], [`Acceleration`], [`SensorHandle`]
//! - [`NetworkLink`], [`HardwareAddress`]
//! - [`SystemClock`], [`WallTime`]
//! - [`InputSource`], [`KeyEvent`], [`BUTTON_UP`], [`BUTTON_DOWN`]
//! - [`Maintenance`]
//! - [`Board`] — the bundle bring-up consumes
//!
//! ## Ownership
//! The [`Board`] outlives every runtime cycle; per-cycle session objects
//! (display/sensor handles, the broker client) are created during bring-up
//! and discarded wholesale at teardown. The buttons are **not** part of the
//! board: they go straight to the long-lived input poller.

pub mod clock;
pub mod display;
pub mod input;
pub mod maintenance;
pub mod net;
pub mod sensor;
pub mod stub;

pub use clock::{SystemClock, WallTime};
pub use display::{ColorOrder, DisplayHandle, Layer, MatrixDriver, MatrixOptions, Rotation};
pub use input::{InputSource, KeyEvent, BUTTON_DOWN, BUTTON_UP};
pub use maintenance::Maintenance;
pub use net::{HardwareAddress, NetworkLink};
pub use sensor::{Acceleration, Accelerometer, SensorHandle};

use crate::link::LinkFactory;

/// Everything bring-up needs, bundled.
///
/// Construct one at process start and hand it to the supervisor; it is reused
/// across every restart. Driver state that must survive restarts (sockets,
/// peripherals) lives inside the trait objects.
pub struct Board {
    /// LED matrix driver.
    pub matrix: Box<dyn MatrixDriver>,
    /// Orientation sensor driver.
    pub sensor: Box<dyn Accelerometer>,
    /// WiFi / network stack.
    pub network: Box<dyn NetworkLink>,
    /// Real-time clock.
    pub clock: Box<dyn SystemClock>,
    /// Broker client factory.
    pub link: Box<dyn LinkFactory>,
    /// Heap compaction hook.
    pub maintenance: Box<dyn Maintenance>,
}
