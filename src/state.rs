//! # Per-cycle session state.
//!
//! [`RunState`] is everything bring-up produced for one runtime cycle. The
//! supervisor owns it, tasks borrow it through an `Arc` for the duration of
//! the cycle, and teardown discards it wholesale. There is no partial reset:
//! a restart always builds a new `RunState` from scratch.

use std::fmt;

use tokio::sync::Mutex;

use crate::hal::{DisplayHandle, Rotation, SensorHandle};
use crate::identity::DeviceId;
use crate::link::MessageClient;

/// Session state for one runtime cycle.
///
/// At teardown the supervisor reclaims sole ownership (`Arc::try_unwrap`);
/// a task that held its clone past teardown is a bug and gets announced as
/// such.
pub struct RunState {
    /// Identity derived during this cycle's bring-up.
    pub identity: DeviceId,
    /// Rotation picked from the bring-up sensor reading.
    pub rotation: Rotation,
    /// Live display session.
    pub display: DisplayHandle,
    /// Live sensor session.
    pub sensor: SensorHandle,
    /// Live broker session. Behind an async lock because `service` holds it
    /// across a suspension point; contention is nil outside teardown.
    pub client: Mutex<Box<dyn MessageClient>>,
}

impl fmt::Debug for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunState")
            .field("identity", &self.identity)
            .field("rotation", &self.rotation)
            .field("display", &self.display)
            .field("sensor", &self.sensor)
            .finish_non_exhaustive()
    }
}
