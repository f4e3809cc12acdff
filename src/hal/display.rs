//! # Matrix display capability.
//!
//! [`MatrixDriver`] is the runtime's only view of the LED panel: configure it
//! once per cycle, rotate it to match how the device is mounted, and hand it a
//! root [`Layer`] to present. Rendering into layers is out of scope here;
//! bring-up shows an empty root to blank the boot screen.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::HalError;
use crate::hal::sensor::Acceleration;

static NEXT_DISPLAY_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Matrix geometry and panel wiring options.
#[derive(Clone, Copy, Debug)]
pub struct MatrixOptions {
    /// Panel width in pixels.
    pub width: u32,
    /// Panel height in pixels.
    pub height: u32,
    /// Color depth in bits per channel.
    pub bit_depth: u8,
    /// Subpixel wiring order of the panel.
    pub color_order: ColorOrder,
}

impl Default for MatrixOptions {
    /// 64×32 panel, 6-bit color, RGB order.
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
            bit_depth: 6,
            color_order: ColorOrder::Rgb,
        }
    }
}

/// Subpixel wiring order of the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorOrder {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl std::fmt::Display for ColorOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColorOrder::Rgb => "RGB",
            ColorOrder::Rbg => "RBG",
            ColorOrder::Grb => "GRB",
            ColorOrder::Gbr => "GBR",
            ColorOrder::Brg => "BRG",
            ColorOrder::Bgr => "BGR",
        };
        f.write_str(s)
    }
}

/// Display rotation in quarter turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation in degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Picks the rotation that puts "up" at the top of the panel, given one
    /// gravity reading.
    ///
    /// The reading is folded into a quarter-turn sector with a half-sector
    /// offset, so a device mounted slightly off-axis still snaps to the
    /// nearest right angle. Called once per bring-up; the runtime never
    /// re-rotates a live display.
    pub fn from_acceleration(a: Acceleration) -> Rotation {
        use std::f32::consts::{PI, TAU};
        let turns = ((-a.y).atan2(-a.x) + PI) / TAU + 0.875;
        match (turns * 4.0) as u32 % 4 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }
}

/// Opaque handle to a configured display.
///
/// Carries a process-unique instance number so a discarded cycle's display is
/// distinguishable from its replacement in logs and tests.
#[derive(Debug)]
pub struct DisplayHandle {
    instance: u64,
}

impl DisplayHandle {
    /// Allocates a handle with the next instance number.
    ///
    /// Called by driver implementations from [`MatrixDriver::configure`].
    pub fn new() -> Self {
        Self {
            instance: NEXT_DISPLAY_INSTANCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Process-unique instance number of this handle.
    pub fn instance(&self) -> u64 {
        self.instance
    }
}

impl Default for DisplayHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Root of a renderable scene.
///
/// The runtime only ever shows the empty root (blanking the panel at
/// bring-up); applications build real content on top of the same type.
#[derive(Clone, Debug)]
pub struct Layer(());

impl Layer {
    /// An empty root layer.
    pub fn empty() -> Self {
        Layer(())
    }
}

/// Capability contract for the LED matrix.
///
/// Implementations own the panel peripheral; the runtime drives it only
/// through this trait.
pub trait MatrixDriver: Send {
    /// Configures the panel and returns a handle to the live display.
    fn configure(&mut self, options: &MatrixOptions) -> Result<DisplayHandle, HalError>;

    /// Applies a rotation to a configured display.
    fn set_rotation(&mut self, display: &DisplayHandle, rotation: Rotation) -> Result<(), HalError>;

    /// Presents a root layer on a configured display.
    fn show(&mut self, display: &DisplayHandle, root: Layer) -> Result<(), HalError>;
}
