//! Detection and redaction engine
//!
//! Detectors turn a text plus a [`Vault`](scrub_core::Vault) into span-accurate
//! matches, the scan engine composes them into a deduplicated
//! [`MatchSet`](scrub_core::MatchSet), and the redactor rewrites the text.

pub mod builtin;
pub mod detector;
pub mod redactor;
pub mod scan;

pub use builtin::builtin_patterns;
pub use detector::{Detection, Detector, ExactDetector, PatternDetector};
pub use redactor::{DEFAULT_REDACTION_TOKEN, Redactor};
pub use scan::{ScanEngine, ScanReport, ScanWarning, scan};
