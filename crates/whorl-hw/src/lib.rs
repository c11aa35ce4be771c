//! whorl-hw — Hardware abstraction for imaging fingerprint sensors.
//!
//! Defines the hook set a driver implements, the static descriptor
//! metadata it registers, and the grayscale frame type that crosses the
//! driver boundary.

pub mod driver;
pub mod image;

pub use driver::{Capabilities, DriverDescriptor, DriverError, ImageDriver};
pub use image::{FingerImage, ImageFlags};
