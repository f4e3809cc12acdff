//! # Discrete input capability.
//!
//! [`InputSource`] wraps whatever debouncing the board does (hardware or a
//! helper library) behind a single non-blocking poll. The runtime only reacts
//! to pressed edges; releases are polled and discarded.

use crate::error::HalError;

/// Logical id of the upper button.
pub const BUTTON_UP: u8 = 0;
/// Logical id of the lower button.
pub const BUTTON_DOWN: u8 = 1;

/// One debounced key edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Logical button id ([`BUTTON_UP`], [`BUTTON_DOWN`], ...).
    pub key: u8,
    /// `true` for a pressed edge, `false` for a released edge.
    pub pressed: bool,
}

/// Capability contract for the debounced buttons.
pub trait InputSource: Send {
    /// Returns at most one pending edge without blocking.
    ///
    /// `Ok(None)` means no edge is pending; it is the common case and not an
    /// error.
    fn poll_event(&mut self) -> Result<Option<KeyEvent>, HalError>;
}
