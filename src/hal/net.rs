//! # Network stack capability.
//!
//! [`NetworkLink`] covers the WiFi association, the hardware address the
//! device identity is derived from, and the network-time fetch. Socket-level
//! traffic never passes through this trait; the messaging client owns its own
//! transport.

use crate::error::HalError;

/// Six-byte hardware (MAC) address of the network interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HardwareAddress(pub [u8; 6]);

impl HardwareAddress {
    /// The raw address bytes.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

/// Capability contract for the network stack.
pub trait NetworkLink: Send {
    /// Associates with the configured access point. Blocks until associated
    /// or failed; bring-up treats failure as fatal.
    fn connect(&mut self) -> Result<(), HalError>;

    /// Hardware address of the interface. Stable across restarts.
    fn hardware_address(&mut self) -> Result<HardwareAddress, HalError>;

    /// Fetches the current time from the network time service, as the
    /// service's textual timestamp.
    fn network_time(&mut self) -> Result<String, HalError>;
}
