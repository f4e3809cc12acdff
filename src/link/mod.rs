//! Messaging link: capability contracts and session-state tracking.
//!
//! ## Contents
//! - [`MessageClient`], [`LinkFactory`], [`LinkEvents`], [`LinkOptions`],
//!   [`QoS`] — the capability surface a broker client implements
//! - [`LinkMonitor`], [`ConnectionState`] — the runtime's own handler, which
//!   tracks session state and publishes link events
//!
//! ## Quick wiring
//! ```text
//! bring-up:  factory.open(&options, monitor) ─► Box<dyn MessageClient>
//!            monitor.mark_connecting(); client.connect()
//! per pass:  LinkPump locks the client, client.service(timeout)
//!                └─► callbacks land on LinkMonitor, which gates on state
//! teardown:  client dropped (session closes), monitor.reset()
//! ```

mod client;
mod monitor;

pub use client::{LinkEvents, LinkFactory, LinkOptions, MessageClient, QoS};
pub use monitor::{ConnectionState, LinkMonitor};
