use serde::{Deserialize, Serialize};
use thiserror::Error;
use whorl_hw::FingerImage;

/// Feature set extracted from one standardized frame.
///
/// The payload is opaque: only a matcher that understands the
/// extractor's encoding can interpret it. The minutiae count rides
/// alongside so the quality gate can judge a capture without decoding
/// anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub data: Vec<u8>,
    pub minutiae_count: u32,
}

/// Turns a standardized frame into a [`Template`].
pub trait FeatureExtractor {
    fn extract(&mut self, image: &FingerImage) -> Result<Template, ExtractError>;
}

/// Scores how alike two templates are; higher means more alike.
pub trait TemplateMatcher {
    fn compare(&self, enrolled: &Template, probe: &Template) -> Result<u32, MatchError>;
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("feature extraction failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("templates are not comparable: {0}")]
    Incompatible(String),
    #[error("template comparison failed: {0}")]
    Failed(String),
}

/// What an enrollment attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// The capture was good enough; the template is ready to store.
    Complete(Template),
    /// Too few minutiae were found. Nothing was kept; present the
    /// finger again.
    Retry,
}

/// What a verification attempt decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The presented finger matches the enrolled template.
    Match,
    /// The presented finger does not match.
    NoMatch,
    /// The capture was too weak to decide either way.
    Retry,
}
