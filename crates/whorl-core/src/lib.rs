//! whorl-core — Device sessions, validated capture, and the
//! enroll/verify engines for image-based fingerprint sensors.
//!
//! Drivers implement [`whorl_hw::ImageDriver`]; this crate layers the
//! session lifecycle, the await/capture/validate sequence, and the
//! enrollment and verification decision policy on top. Feature
//! extraction and template comparison are injected through the traits
//! in [`types`].

pub mod engine;
pub mod session;
pub mod types;

pub use engine::{Engine, EngineError, MATCH_THRESHOLD, MIN_MINUTIAE};
pub use session::ImgSession;
pub use types::{
    EnrollOutcome, ExtractError, FeatureExtractor, MatchError, Template, TemplateMatcher,
    VerifyOutcome,
};
