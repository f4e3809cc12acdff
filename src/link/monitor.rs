//! # Link state tracking.
//!
//! [`LinkMonitor`] is the runtime's [`LinkEvents`] handler: it keeps the
//! authoritative [`ConnectionState`] and turns callback invocations into bus
//! events.
//!
//! ## Architecture
//! ```text
//! MessageClient::service() ──► LinkMonitor (LinkEvents)
//!        (pump slot)                │
//!                                  ├─► AtomicU8 connection state
//!                                  └─► Bus: LinkConnected / LinkDisconnected /
//!                                           LinkMessage / LinkMessageDropped
//! ```
//!
//! ## Rules
//! - Message callbacks are forwarded only while `Connected`; anything that
//!   arrives earlier or later is counted and announced as dropped.
//! - Callbacks run synchronously in the pump's slot, so state updates are
//!   plain atomic stores.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::events::{Bus, Event, EventKind};
use crate::link::client::LinkEvents;

/// Lifecycle of the messaging session, as last reported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session; the initial and post-teardown state.
    Disconnected,
    /// Connect handshake requested, not yet acknowledged.
    Connecting,
    /// Session established; messages flow.
    Connected,
}

impl ConnectionState {
    fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
        }
    }

    fn from_u8(raw: u8) -> ConnectionState {
        match raw {
            2 => ConnectionState::Connected,
            1 => ConnectionState::Connecting,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Tracks the messaging session state and publishes link events.
///
/// One monitor outlives all cycles; [`LinkMonitor::reset`] returns it to
/// `Disconnected` whenever a cycle is torn down.
pub struct LinkMonitor {
    state: AtomicU8,
    bus: Bus,
}

impl LinkMonitor {
    /// Creates a monitor in the `Disconnected` state.
    pub fn new(bus: Bus) -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Disconnected.as_u8()),
            bus,
        }
    }

    /// Current session state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Marks the handshake as requested. Called by bring-up just before
    /// `MessageClient::connect`.
    pub(crate) fn mark_connecting(&self) {
        self.state.store(ConnectionState::Connecting.as_u8(), Ordering::Release);
    }

    /// Returns to `Disconnected`. Called at cycle teardown.
    pub(crate) fn reset(&self) {
        self.state.store(ConnectionState::Disconnected.as_u8(), Ordering::Release);
    }
}

impl LinkEvents for LinkMonitor {
    fn on_connect(&self, session_present: bool, code: u8) {
        self.state.store(ConnectionState::Connected.as_u8(), Ordering::Release);
        self.bus.publish(
            Event::new(EventKind::LinkConnected)
                .with_reason(format!("session_present={session_present} code={code}")),
        );
    }

    fn on_disconnect(&self, code: u8) {
        self.state.store(ConnectionState::Disconnected.as_u8(), Ordering::Release);
        self.bus
            .publish(Event::new(EventKind::LinkDisconnected).with_reason(format!("code={code}")));
    }

    fn on_message(&self, topic: &str, payload: &[u8]) {
        if self.state() != ConnectionState::Connected {
            self.bus
                .publish(Event::new(EventKind::LinkMessageDropped).with_topic(topic));
            return;
        }
        self.bus.publish(
            Event::new(EventKind::LinkMessage)
                .with_topic(topic)
                .with_payload(payload.to_vec()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_and_disconnect_move_the_state() {
        let bus = Bus::new(16);
        let monitor = LinkMonitor::new(bus.clone());
        assert_eq!(monitor.state(), ConnectionState::Disconnected);

        monitor.mark_connecting();
        assert_eq!(monitor.state(), ConnectionState::Connecting);

        monitor.on_connect(false, 0);
        assert_eq!(monitor.state(), ConnectionState::Connected);

        monitor.on_disconnect(0);
        assert_eq!(monitor.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn messages_flow_only_while_connected() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let monitor = LinkMonitor::new(bus.clone());

        monitor.on_message("matrixportal/246f28ab/cmd", b"early");
        let dropped = rx.recv().await.unwrap();
        assert_eq!(dropped.kind, EventKind::LinkMessageDropped);
        assert_eq!(dropped.topic.as_deref(), Some("matrixportal/246f28ab/cmd"));
        assert!(dropped.payload.is_none());

        monitor.on_connect(true, 0);
        let connected = rx.recv().await.unwrap();
        assert_eq!(connected.kind, EventKind::LinkConnected);

        monitor.on_message("matrixportal/246f28ab/cmd", b"hello");
        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered.kind, EventKind::LinkMessage);
        assert_eq!(delivered.payload.as_deref(), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn reset_returns_to_disconnected() {
        let bus = Bus::new(16);
        let monitor = LinkMonitor::new(bus);
        monitor.on_connect(false, 0);
        monitor.reset();
        assert_eq!(monitor.state(), ConnectionState::Disconnected);
    }
}
