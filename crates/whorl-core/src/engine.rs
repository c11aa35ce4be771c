//! Enrollment and verification engines.
//!
//! Both run the same capture/standardize/extract pipeline over a
//! session, then diverge: enrollment keeps the template, verification
//! scores it against an enrolled one. The quality gate and match
//! threshold are fixed policy of this crate, not configuration.

use crate::session::ImgSession;
use crate::types::{
    EnrollOutcome, ExtractError, FeatureExtractor, MatchError, Template, TemplateMatcher,
    VerifyOutcome,
};
use thiserror::Error;
use whorl_hw::{DriverError, ImageDriver};

/// Minimum minutiae a template needs before it is worth keeping.
pub const MIN_MINUTIAE: u32 = 10;

/// Comparison score at or above which two prints count as the same finger.
pub const MATCH_THRESHOLD: u32 = 40;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),
    #[error("comparison error: {0}")]
    Compare(#[from] MatchError),
}

/// Enroll/verify policy layered over a session's validated captures.
///
/// Holds the injected extraction and comparison oracles. A `Retry`
/// outcome is not a failure: the weak template has been discarded and
/// the caller decides whether to ask for the finger again.
pub struct Engine<E, M> {
    extractor: E,
    matcher: M,
}

impl<E: FeatureExtractor, M: TemplateMatcher> Engine<E, M> {
    pub fn new(extractor: E, matcher: M) -> Self {
        Self { extractor, matcher }
    }

    /// Capture one frame and turn it into a template for storage.
    ///
    /// A capture with fewer than [`MIN_MINUTIAE`] features yields
    /// [`EnrollOutcome::Retry`]; the template never leaves this call.
    // TODO: multi-stage enrollment: capture several frames, keep the
    // best-quality template, discard the rest.
    pub fn enroll<D: ImageDriver>(
        &mut self,
        session: &mut ImgSession<D>,
    ) -> Result<EnrollOutcome, EngineError> {
        let mut image = session.capture(false)?;
        image.standardize();

        let extracted = self.extractor.extract(&image);
        drop(image);
        let template = extracted?;

        if template.minutiae_count < MIN_MINUTIAE {
            tracing::debug!(
                count = template.minutiae_count,
                min = MIN_MINUTIAE,
                "not enough minutiae, enrollment must be retried"
            );
            return Ok(EnrollOutcome::Retry);
        }

        Ok(EnrollOutcome::Complete(template))
    }

    /// Capture one frame and decide whether it matches `enrolled`.
    ///
    /// The same quality gate as enrollment applies to the probe; a weak
    /// capture yields [`VerifyOutcome::Retry`] without consulting the
    /// matcher.
    pub fn verify<D: ImageDriver>(
        &mut self,
        session: &mut ImgSession<D>,
        enrolled: &Template,
    ) -> Result<VerifyOutcome, EngineError> {
        let mut image = session.capture(false)?;
        image.standardize();

        let extracted = self.extractor.extract(&image);
        drop(image);
        let probe = extracted?;

        if probe.minutiae_count < MIN_MINUTIAE {
            tracing::debug!(
                count = probe.minutiae_count,
                min = MIN_MINUTIAE,
                "not enough minutiae, verification must be retried"
            );
            return Ok(VerifyOutcome::Retry);
        }

        let score = self.matcher.compare(enrolled, &probe)?;
        tracing::debug!(score, threshold = MATCH_THRESHOLD, "templates compared");

        if score >= MATCH_THRESHOLD {
            Ok(VerifyOutcome::Match)
        } else {
            Ok(VerifyOutcome::NoMatch)
        }
    }
}
