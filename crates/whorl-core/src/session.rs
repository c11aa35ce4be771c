//! Device session lifecycle and the validated capture sequence.

use whorl_hw::{DriverDescriptor, DriverError, FingerImage, ImageDriver};

/// Image devices build a full template from a single capture.
const ENROLL_STAGES: u32 = 1;

/// One opened imaging device.
///
/// Owns the driver's private state for its whole lifetime: the state is
/// created by [`open`](Self::open) and released when the session drops,
/// with the driver's exit hook run first. Callers must serialize
/// capture/enroll/verify against a session; the session itself takes no
/// locks, and `&mut self` on every operation keeps a second call from
/// racing the first.
#[derive(Debug)]
pub struct ImgSession<D: ImageDriver> {
    driver: D,
    descriptor: DriverDescriptor,
    enroll_stages: u32,
}

impl<D: ImageDriver> ImgSession<D> {
    /// Open a session over `driver`, running its init hook with the
    /// device-variant selector from the enumeration layer.
    ///
    /// On hook failure the driver state is released right here and the
    /// error propagates; the exit hook is not run for a session that
    /// never opened.
    pub fn open(mut driver: D, variant: u64) -> Result<Self, DriverError> {
        let descriptor = driver.descriptor().clone();
        if descriptor.frame_width == 0 || descriptor.frame_height == 0 {
            return Err(DriverError::InvalidArgument(format!(
                "driver {} declares an empty frame geometry",
                descriptor.name
            )));
        }

        driver.init(variant)?;
        tracing::debug!(driver = %descriptor.name, variant, "session opened");

        Ok(Self {
            driver,
            descriptor,
            enroll_stages: ENROLL_STAGES,
        })
    }

    /// Static metadata for the driver behind this session.
    pub fn descriptor(&self) -> &DriverDescriptor {
        &self.descriptor
    }

    /// Number of discrete captures a full enrollment needs.
    pub fn enroll_stages(&self) -> u32 {
        self.enroll_stages
    }

    /// Run the full capture sequence and hand back a validated frame.
    ///
    /// Unless `unconditional`, the await-finger hooks bracket the
    /// capture hook and may block indefinitely. Any hook failure aborts
    /// the sequence and propagates as-is; a failure of the trailing
    /// await discards the frame that was already produced, since a
    /// capture only counts once the finger has lifted cleanly.
    ///
    /// The returned frame always carries the descriptor's declared
    /// geometry, whatever the driver wrote, and has passed the sanity
    /// screen.
    pub fn capture(&mut self, unconditional: bool) -> Result<FingerImage, DriverError> {
        if unconditional && !self.descriptor.capabilities.unconditional_capture {
            tracing::debug!(
                driver = %self.descriptor.name,
                "unconditional capture requested but driver does not support it"
            );
            return Err(DriverError::NotSupported);
        }

        tracing::debug!(driver = %self.descriptor.name, unconditional, "handling capture request");

        if !unconditional {
            if let Err(e) = self.driver.await_finger_on() {
                tracing::error!(driver = %self.descriptor.name, error = %e, "await_finger_on failed");
                return Err(e);
            }
        }

        let frame = match self.driver.capture(unconditional) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(driver = %self.descriptor.name, error = %e, "capture failed");
                return Err(e);
            }
        };

        if !unconditional {
            if let Err(e) = self.driver.await_finger_off() {
                tracing::error!(driver = %self.descriptor.name, error = %e, "await_finger_off failed");
                return Err(e);
            }
        }

        let Some(mut image) = frame else {
            tracing::error!(driver = %self.descriptor.name, "capture reported success but produced no frame");
            return Err(DriverError::OperationInconsistent(
                "capture succeeded with no frame".into(),
            ));
        };

        // The driver's idea of its own geometry is not trusted.
        image.width = self.descriptor.frame_width;
        image.height = self.descriptor.frame_height;

        if !image.is_sane() {
            tracing::error!(driver = %self.descriptor.name, "captured frame failed the sanity screen");
            return Err(DriverError::Io("captured frame failed the sanity screen".into()));
        }

        Ok(image)
    }
}

impl<D: ImageDriver> Drop for ImgSession<D> {
    fn drop(&mut self) {
        tracing::debug!(driver = %self.descriptor.name, "session closed");
        self.driver.exit();
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::{CaptureBehavior, FakeDriver, FRAME_HEIGHT, FRAME_WIDTH};
    use super::*;
    use std::sync::atomic::Ordering;
    use whorl_hw::{Capabilities, ImageFlags};

    fn unconditional_caps() -> Capabilities {
        Capabilities {
            unconditional_capture: true,
        }
    }

    #[test]
    fn test_unconditional_capture_needs_the_capability() {
        let driver = FakeDriver::new(Capabilities::default());
        let calls = driver.calls.clone();
        let mut session = ImgSession::open(driver, 0).unwrap();

        let err = session.capture(true).unwrap_err();
        assert!(matches!(err, DriverError::NotSupported));
        // the capture hook was never reached
        assert_eq!(*calls.lock().unwrap(), vec!["init"]);
    }

    #[test]
    fn test_conditional_capture_runs_the_full_hook_sequence() {
        let driver = FakeDriver::new(Capabilities::default());
        let calls = driver.calls.clone();
        let mut session = ImgSession::open(driver, 0).unwrap();

        let image = session.capture(false).unwrap();
        assert_eq!(image.width, FRAME_WIDTH);
        assert_eq!(image.height, FRAME_HEIGHT);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["init", "finger_on", "capture", "finger_off"]
        );
    }

    #[test]
    fn test_unconditional_capture_skips_the_await_hooks() {
        let driver = FakeDriver::new(unconditional_caps());
        let calls = driver.calls.clone();
        let mut session = ImgSession::open(driver, 0).unwrap();

        session.capture(true).unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["init", "capture"]);
    }

    #[test]
    fn test_driver_reported_geometry_is_overwritten() {
        let mut driver = FakeDriver::new(Capabilities::default());
        driver.behavior = CaptureBehavior::Frame {
            width: 1,
            height: 1,
            flags: ImageFlags::default(),
        };
        let mut session = ImgSession::open(driver, 0).unwrap();

        let image = session.capture(false).unwrap();
        assert_eq!(image.width, FRAME_WIDTH);
        assert_eq!(image.height, FRAME_HEIGHT);
    }

    #[test]
    fn test_success_without_a_frame_is_a_contract_violation() {
        let mut driver = FakeDriver::new(Capabilities::default());
        driver.behavior = CaptureBehavior::Empty;
        let mut session = ImgSession::open(driver, 0).unwrap();

        let err = session.capture(false).unwrap_err();
        assert!(matches!(err, DriverError::OperationInconsistent(_)));
    }

    #[test]
    fn test_await_finger_on_failure_aborts_before_capture() {
        let mut driver = FakeDriver::new(Capabilities::default());
        driver.finger_on_error = Some(DriverError::NoData);
        let calls = driver.calls.clone();
        let mut session = ImgSession::open(driver, 0).unwrap();

        let err = session.capture(false).unwrap_err();
        assert!(matches!(err, DriverError::NoData));
        assert_eq!(*calls.lock().unwrap(), vec!["init", "finger_on"]);
    }

    #[test]
    fn test_await_finger_off_failure_discards_the_capture() {
        let mut driver = FakeDriver::new(Capabilities::default());
        driver.finger_off_error = Some(DriverError::Io("finger stuck".into()));
        let calls = driver.calls.clone();
        let mut session = ImgSession::open(driver, 0).unwrap();

        let err = session.capture(false).unwrap_err();
        assert!(matches!(err, DriverError::Io(_)));
        // the capture hook did run; its frame is gone regardless
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["init", "finger_on", "capture", "finger_off"]
        );
    }

    #[test]
    fn test_capture_failure_propagates_unchanged() {
        let mut driver = FakeDriver::new(Capabilities::default());
        driver.behavior = CaptureBehavior::Fail;
        let calls = driver.calls.clone();
        let mut session = ImgSession::open(driver, 0).unwrap();

        let err = session.capture(false).unwrap_err();
        assert!(matches!(err, DriverError::Io(_)));
        // finger_off is never consulted once capture has failed
        assert_eq!(*calls.lock().unwrap(), vec!["init", "finger_on", "capture"]);
    }

    #[test]
    fn test_blank_frame_fails_the_sanity_screen() {
        let mut driver = FakeDriver::new(Capabilities::default());
        driver.behavior = CaptureBehavior::Blank;
        let mut session = ImgSession::open(driver, 0).unwrap();

        let err = session.capture(false).unwrap_err();
        assert!(matches!(err, DriverError::Io(_)));
    }

    #[test]
    fn test_failed_init_propagates_and_skips_the_exit_hook() {
        let mut driver = FakeDriver::new(Capabilities::default());
        driver.init_error = Some(DriverError::Io("reset failed".into()));
        let exits = driver.exits.clone();

        let err = ImgSession::open(driver, 0).unwrap_err();
        assert!(matches!(err, DriverError::Io(_)));
        assert_eq!(exits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dropping_the_session_runs_the_exit_hook_once() {
        let driver = FakeDriver::new(Capabilities::default());
        let exits = driver.exits.clone();

        let session = ImgSession::open(driver, 0).unwrap();
        drop(session);
        assert_eq!(exits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_declared_geometry_is_rejected() {
        let mut driver = FakeDriver::new(Capabilities::default());
        driver.descriptor.frame_width = 0;

        let err = ImgSession::open(driver, 0).unwrap_err();
        assert!(matches!(err, DriverError::InvalidArgument(_)));
    }

    #[test]
    fn test_enroll_stage_count_is_fixed_at_one() {
        let session = ImgSession::open(FakeDriver::new(Capabilities::default()), 0).unwrap();
        assert_eq!(session.enroll_stages(), 1);
    }
}
