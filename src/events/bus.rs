//! # Event distribution.
//!
//! Every part of the runtime reports through one [`Bus`]: bring-up, the
//! cooperative tasks, the link monitor, and the supervisor itself publish
//! [`Event`]s, and a single listener inside the supervisor fans them out to
//! registered subscribers.
//!
//! ```text
//!   bring-up    ──┐
//!   InputPoller ──┤
//!   LinkPump    ──┼──────► Bus ───────► subscriber_listener ────► SubscriberSet
//!   LinkMonitor ──┤  (broadcast chan)    (in Supervisor)
//!   Supervisor  ──┘
//! ```
//!
//! The bus sits on [`tokio::sync::broadcast`]: publishing never waits, the
//! ring buffer holds the most recent `capacity` events, and a receiver that
//! falls behind sees `RecvError::Lagged` instead of stalling publishers.
//! Nothing is persisted; an event published with no receiver is gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Handle for publishing and subscribing to the runtime's event stream.
///
/// Clones share one underlying channel, so any component holding a `Bus`
/// can publish concurrently with the others.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring buffer holds `capacity` events.
    ///
    /// A zero-capacity broadcast channel is invalid, so the capacity is
    /// clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes to whoever is subscribed right now.
    ///
    /// Never waits. With no receivers the event is simply discarded.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens an independent receiver that sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn delivers_to_receivers_subscribed_before_publish() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::Tick));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::Tick);
    }

    #[tokio::test]
    async fn publish_without_receivers_is_silent() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::Tick));
        // nothing to assert: publish must not block or panic
    }

    #[test]
    fn zero_capacity_is_clamped() {
        // broadcast::channel panics on 0; the clamp keeps this constructible
        let _ = Bus::new(0);
    }
}
