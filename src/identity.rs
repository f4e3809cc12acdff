//! # Device identity.
//!
//! Every topic the device touches is namespaced by a short stable id derived
//! from the network interface's hardware address: the first four bytes,
//! rendered as lowercase zero-padded hex. Derivation is pure; the same
//! address always yields the same id, on every boot and every restart.

use crate::hal::HardwareAddress;

/// Identity derived from the hardware address.
///
/// ```
/// use panelvisor::DeviceId;
/// use panelvisor::hal::HardwareAddress;
///
/// let id = DeviceId::from_hardware_address(HardwareAddress([0x24, 0x6f, 0x28, 0xab, 0x00, 0x01]));
/// assert_eq!(id.to_string(), "246f28ab");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceId([u8; 4]);

impl DeviceId {
    /// Derives the id from a hardware address: first four bytes, in order.
    pub fn from_hardware_address(addr: HardwareAddress) -> DeviceId {
        let octets = addr.octets();
        DeviceId([octets[0], octets[1], octets[2], octets[3]])
    }

    /// The control-channel topic filter for this device:
    /// `{prefix}/{id}/#`.
    pub fn control_topic(&self, prefix: &str) -> String {
        format!("{prefix}/{self}/#")
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a:02x}{b:02x}{c:02x}{d:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_uses_the_first_four_bytes() {
        let id = DeviceId::from_hardware_address(HardwareAddress([
            0x24, 0x6f, 0x28, 0xab, 0x00, 0x01,
        ]));
        assert_eq!(id.to_string(), "246f28ab");
    }

    #[test]
    fn trailing_bytes_do_not_matter() {
        let a = DeviceId::from_hardware_address(HardwareAddress([1, 2, 3, 4, 5, 6]));
        let b = DeviceId::from_hardware_address(HardwareAddress([1, 2, 3, 4, 0xff, 0xee]));
        assert_eq!(a, b);
    }

    #[test]
    fn rendering_is_zero_padded_lowercase() {
        let id = DeviceId::from_hardware_address(HardwareAddress([0x00, 0x0a, 0xb0, 0x0f, 0, 0]));
        assert_eq!(id.to_string(), "000ab00f");
    }

    #[test]
    fn control_topic_is_prefix_id_wildcard() {
        let id = DeviceId::from_hardware_address(HardwareAddress([
            0x24, 0x6f, 0x28, 0xab, 0x00, 0x01,
        ]));
        assert_eq!(id.control_topic("matrixportal"), "matrixportal/246f28ab/#");
    }
}
