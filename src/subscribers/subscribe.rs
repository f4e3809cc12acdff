//! # Subscriber contract.
//!
//! Anything that wants to watch the runtime (a logger, a telemetry uploader,
//! a status widget) implements [`Subscribe`] and receives every [`Event`] in
//! publish order. Delivery happens on a worker owned by
//! [`SubscriberSet`](crate::subscribers::SubscriberSet), behind a bounded
//! queue, so a slow or panicking subscriber never stalls the supervisor or
//! its peers.

use crate::events::Event;
use async_trait::async_trait;

/// Receives the runtime's event stream.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// Runs on the subscriber's own worker; taking a while here only backs
    /// up this subscriber's queue. Panics are caught and reported, not
    /// propagated.
    async fn on_event(&self, event: &Event);

    /// Name used when reporting queue drops and panics.
    ///
    /// The default is the full type name, which reads poorly in logs;
    /// override it with something short.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Depth of this subscriber's queue.
    ///
    /// When the queue is full, the incoming event is dropped for this
    /// subscriber alone.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
