//! # Messaging link capability.
//!
//! The runtime talks to its broker through three small contracts:
//!
//! - [`LinkEvents`] — the fixed callback surface a client invokes from inside
//!   [`MessageClient::service`]. One concrete handler object is injected at
//!   construction; there is no per-callback registration.
//! - [`MessageClient`] — one live session: connect, subscribe, and a bounded
//!   `service` step the pump calls over and over. Dropping the client closes
//!   the session.
//! - [`LinkFactory`] — builds a fresh client per cycle. The factory outlives
//!   restarts; clients never do.

use std::sync::Arc;
use std::time::Duration;

use crate::error::HalError;

/// Delivery guarantee requested on subscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QoS {
    /// Fire and forget.
    AtMostOnce,
    /// Acknowledged delivery, duplicates possible.
    AtLeastOnce,
    /// Exactly-once handshake.
    ExactlyOnce,
}

impl QoS {
    /// Protocol-level quality-of-service number.
    pub fn level(&self) -> u8 {
        match self {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

/// Broker endpoint and credentials.
#[derive(Clone, Debug)]
pub struct LinkOptions {
    /// Broker host name or address.
    pub broker: String,
    /// Optional username.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Broker port.
    pub port: u16,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            broker: String::new(),
            username: None,
            password: None,
            port: 1883,
        }
    }
}

/// Callback surface invoked by a client during [`MessageClient::service`].
///
/// Callbacks run synchronously inside the pump's slot and must not block;
/// hand anything slow to the event bus and return.
pub trait LinkEvents: Send + Sync {
    /// Session established. `session_present` echoes the broker's session
    /// flag; `code` is the protocol return code (0 = accepted).
    fn on_connect(&self, session_present: bool, code: u8);

    /// Session lost. `code` is the protocol reason code.
    fn on_disconnect(&self, code: u8);

    /// An inbound message on a subscribed topic.
    fn on_message(&self, topic: &str, payload: &[u8]);
}

/// One live broker session.
///
/// Methods take `&mut self`; the pump serializes access behind a lock. All
/// I/O is bounded: `service` does at most one unit of work per call and
/// returns within roughly the given timeout.
pub trait MessageClient: Send {
    /// Performs the protocol connect handshake. The handler's
    /// [`LinkEvents::on_connect`] fires from inside this call on success.
    fn connect(&mut self) -> Result<(), HalError>;

    /// Subscribes to a topic filter at the given QoS.
    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), HalError>;

    /// Performs one bounded unit of network I/O: flush outbound traffic,
    /// read what is pending, dispatch callbacks, maintain the keep-alive.
    fn service(&mut self, timeout: Duration) -> Result<(), HalError>;
}

/// Builds one [`MessageClient`] per runtime cycle.
///
/// The handler passed to [`LinkFactory::open`] is the cycle's
/// [`LinkEvents`] sink; implementations must invoke it from `connect` and
/// `service`, never from other threads.
pub trait LinkFactory: Send {
    /// Opens an unconnected client bound to the given handler.
    fn open(
        &mut self,
        options: &LinkOptions,
        events: Arc<dyn LinkEvents>,
    ) -> Result<Box<dyn MessageClient>, HalError>;
}
