//! Error types used by the panelvisor runtime and its collaborators.
//!
//! This module defines the error taxonomy in layers:
//!
//! - [`HalError`] — failures surfaced by hardware/link capability implementations.
//! - [`BringupError`] — a [`HalError`] tagged with the bring-up stage that raised it.
//! - [`Fault`] — the supervisor-level classification; any `Fault` restarts the runtime.
//! - [`RuntimeError`] — errors raised by the supervision machinery itself.
//!
//! All types provide `as_label()` for stable snake_case identifiers in logs.

use std::time::Duration;
use thiserror::Error;

/// # Errors surfaced by capability implementations.
///
/// Drivers and link clients report failures through this type; the runtime
/// never inspects vendor-specific detail beyond the variant and its reason.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HalError {
    /// A device refused to initialize or respond (bad wiring, absent chip, driver fault).
    #[error("device error: {reason}")]
    Device {
        /// Driver-provided description of the failure.
        reason: String,
    },

    /// A network or bus transfer failed (socket reset, timeout on the wire).
    #[error("i/o error: {reason}")]
    Io {
        /// Transport-provided description of the failure.
        reason: String,
    },

    /// A peer replied with something the implementation could not interpret.
    #[error("protocol error: {reason}")]
    Protocol {
        /// What was expected and what arrived.
        reason: String,
    },
}

impl HalError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use panelvisor::HalError;
    ///
    /// let err = HalError::Device { reason: "no ack".into() };
    /// assert_eq!(err.as_label(), "hal_device");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HalError::Device { .. } => "hal_device",
            HalError::Io { .. } => "hal_io",
            HalError::Protocol { .. } => "hal_protocol",
        }
    }
}

/// Bring-up stages, in the order they run.
///
/// Each stage depends on every stage before it; a [`BringupError`] names the
/// first stage that failed.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringupStage {
    /// Matrix driver configuration.
    Display,
    /// Accelerometer power-up and warm-up read.
    Sensor,
    /// Orientation pick and display rotation.
    Orientation,
    /// Network association.
    Network,
    /// Device identity derivation from the hardware address.
    Identity,
    /// Wall-clock sync from network time.
    Clock,
    /// Messaging client construction and connect.
    Messaging,
}

impl BringupStage {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BringupStage::Display => "display",
            BringupStage::Sensor => "sensor",
            BringupStage::Orientation => "orientation",
            BringupStage::Network => "network",
            BringupStage::Identity => "identity",
            BringupStage::Clock => "clock",
            BringupStage::Messaging => "messaging",
        }
    }
}

impl std::fmt::Display for BringupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// # Bring-up failure.
///
/// Wraps the [`HalError`] that interrupted bring-up together with the
/// [`BringupStage`] it happened in. Bring-up never retries internally;
/// the supervisor discards the partial state and starts over.
#[derive(Error, Debug)]
#[error("bring-up failed at {stage} stage: {source}")]
pub struct BringupError {
    /// The first stage that failed.
    pub stage: BringupStage,
    /// The capability error that interrupted it.
    #[source]
    pub source: HalError,
}

impl BringupError {
    /// Tags a [`HalError`] with the stage it was raised in.
    pub(crate) fn at(stage: BringupStage) -> impl FnOnce(HalError) -> BringupError {
        move |source| BringupError { stage, source }
    }
}

/// # Supervisor-level fault classification.
///
/// Every fault, whatever its origin, has the same consequence: the current
/// runtime cycle is torn down and bring-up runs again. The classification
/// exists for logs and for restart pacing (consecutive bring-up faults
/// escalate the backoff streak; post-up faults reset it).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Fault {
    /// Bring-up did not complete; no cycle ran.
    #[error(transparent)]
    Bringup(#[from] BringupError),

    /// A task's I/O failed after the runtime was up.
    #[error("i/o fault: {0}")]
    Io(#[from] HalError),

    /// Unexpected internal state: a task exited on its own, panicked,
    /// or a collaborator broke an invariant.
    #[error("logic fault: {reason}")]
    Logic {
        /// Description of the broken expectation.
        reason: String,
    },
}

impl Fault {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use panelvisor::Fault;
    ///
    /// let err = Fault::Logic { reason: "task exited".into() };
    /// assert_eq!(err.as_label(), "fault_logic");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Fault::Bringup(_) => "fault_bringup",
            Fault::Io(_) => "fault_io",
            Fault::Logic { .. } => "fault_logic",
        }
    }
}

/// # Errors produced by the supervision machinery itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some tasks remained stuck and had to be aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// How long teardown was allowed to take.
        grace: Duration,
        /// Names of the tasks that were still running when it ran out.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use panelvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}
