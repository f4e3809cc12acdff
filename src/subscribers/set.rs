//! # Fan-out to subscribers.
//!
//! One [`SubscriberSet`] hands each published event to every registered
//! subscriber. The hand-off is a `try_send` into the subscriber's own
//! bounded queue; the `on_event` call happens later, on that subscriber's
//! worker. Three things follow from this shape:
//!
//! - publishing never waits on a subscriber, however slow;
//! - each subscriber sees events in publish order, but two subscribers can
//!   be at different points of the stream at any moment;
//! - a full queue costs that subscriber the incoming event and costs nobody
//!   else anything.
//!
//! Workers wrap `on_event` in `catch_unwind`: a panicking subscriber is
//! reported on stderr and its worker moves on to the next event.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::events::Event;

use super::Subscribe;

/// One subscriber's queue plus the name to blame when it overflows.
struct Lane {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
}

impl Lane {
    /// Spawns the subscriber's worker and returns the send side of its queue.
    fn open(sub: Arc<dyn Subscribe>) -> Lane {
        let name = sub.name();
        let (queue, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let handled = std::panic::AssertUnwindSafe(sub.on_event(ev.as_ref()))
                    .catch_unwind()
                    .await;
                if let Err(payload) = handled {
                    eprintln!(
                        "[panelvisor] subscriber '{}' panicked: {:?}",
                        sub.name(),
                        payload
                    );
                }
            }
        });

        Lane { name, queue }
    }
}

/// Delivers events to every subscriber without waiting on any of them.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
}

impl SubscriberSet {
    /// Opens one lane (queue + worker) per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            lanes: subs.into_iter().map(Lane::open).collect(),
        }
    }

    /// Queues one event for every subscriber.
    ///
    /// Never waits. A subscriber whose queue is full, or whose worker is
    /// gone, loses this event; the drop is reported on stderr under the
    /// subscriber's name.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for lane in &self.lanes {
            if let Err(err) = lane.queue.try_send(Arc::clone(&ev)) {
                let why = match err {
                    mpsc::error::TrySendError::Full(_) => "queue full",
                    mpsc::error::TrySendError::Closed(_) => "worker gone",
                };
                eprintln!(
                    "[panelvisor] subscriber '{}' dropped event: {}",
                    lane.name, why
                );
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}
