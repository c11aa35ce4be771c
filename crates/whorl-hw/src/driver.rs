//! The contract an imaging driver implements.
//!
//! A driver wraps one sensor model's bus protocol and exposes the hook
//! set the capture layer sequences: capture is mandatory, everything
//! else is optional and defaults to a no-op.

use crate::image::FingerImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a driver hook or the capture sequence can report.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The driver lacks the hook or capability for the requested operation.
    #[error("operation not supported by driver")]
    NotSupported,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("I/O error: {0}")]
    Io(String),
    /// A hook finished without anything to report (e.g. an await that
    /// gave up before a finger arrived).
    #[error("driver returned no data")]
    NoData,
    /// The driver broke its own contract; not retryable.
    #[error("driver contract violation: {0}")]
    OperationInconsistent(String),
}

/// Optional hardware features a driver may declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// The sensor can produce a frame without a finger present.
    pub unconditional_capture: bool,
}

/// Static per-driver metadata, fixed at registration.
///
/// The declared frame geometry is authoritative: whatever dimensions a
/// driver writes into a captured frame are overwritten with these before
/// the frame reaches any consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDescriptor {
    pub name: String,
    pub capabilities: Capabilities,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Hook set for an image-based fingerprint sensor.
///
/// Hooks run synchronously and may block for unbounded real time while a
/// human finger is involved; timeout policy belongs to the driver, not to
/// the layers above. The optional hooks default to no-ops, which is
/// indistinguishable from the hook being absent.
pub trait ImageDriver {
    /// Static metadata describing this driver.
    fn descriptor(&self) -> &DriverDescriptor;

    /// Setup hook, run once when a session opens. `variant` is the
    /// device-variant selector the enumeration layer took from its ID
    /// table; most drivers ignore it.
    fn init(&mut self, variant: u64) -> Result<(), DriverError> {
        let _ = variant;
        Ok(())
    }

    /// Teardown hook, run when the session closes. The driver state is
    /// released afterwards no matter what this does.
    fn exit(&mut self) {}

    /// Acquire one raw frame. `Ok(None)` means the driver claimed
    /// success without producing a frame; the capture layer rejects that
    /// as a contract violation rather than passing it on.
    fn capture(&mut self, unconditional: bool) -> Result<Option<FingerImage>, DriverError>;

    /// Block until a finger rests on the sensor.
    fn await_finger_on(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Block until the finger has been lifted again.
    fn await_finger_off(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}
