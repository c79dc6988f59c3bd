use scrub_core::{AuditWriteError, LoadError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Vault error: {0}")]
    Vault(#[from] LoadError),

    #[error("Audit write failed: {0}")]
    Audit(#[from] AuditWriteError),

    #[error("Configuration error: {0}")]
    Config(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GuardError>;
