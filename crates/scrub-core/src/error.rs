use std::path::PathBuf;

use thiserror::Error;

/// The vault source could not be read or parsed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read vault at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid vault JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid vault TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Malformed vault: {0}")]
    Malformed(String),
}

/// A single named pattern failed to compile. The pattern is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Pattern '{name}' failed to compile: {message}")]
pub struct PatternError {
    pub name: String,
    pub message: String,
}

/// A detector could not produce a usable result. Never fatal to a scan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("Detector '{detector}' failed: {message}")]
    Failed { detector: String, message: String },

    #[error("Detector '{detector}' panicked: {message}")]
    Panicked { detector: String, message: String },

    #[error("Detector '{detector}' returned an invalid span {start}..{end}")]
    InvalidSpan {
        detector: String,
        start: usize,
        end: usize,
    },
}

impl DetectorError {
    pub fn failed(detector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            detector: detector.into(),
            message: message.into(),
        }
    }

    /// Name of the detector this error belongs to.
    pub fn detector(&self) -> &str {
        match self {
            Self::Failed { detector, .. }
            | Self::Panicked { detector, .. }
            | Self::InvalidSpan { detector, .. } => detector,
        }
    }
}

/// The audit sink rejected a record. Always surfaced to the caller.
#[derive(Error, Debug)]
pub enum AuditWriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),
}
