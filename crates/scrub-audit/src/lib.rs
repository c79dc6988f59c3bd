//! Audit sinks for detection events
//!
//! Every scanned phase produces one [`DetectionEvent`]. Sinks append it as a
//! single record and report failures to the caller; a lost audit record is
//! never silently ignored.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlAuditor;
pub use memory::MemoryAuditor;
pub use scrub_core::{AuditWriteError, DetectionEvent};

pub type Result<T> = std::result::Result<T, AuditWriteError>;

/// Append-only destination for detection events.
///
/// Each call appends exactly one record, in call order. Implementations
/// shared between threads serialize their appends.
pub trait AuditSink: Send + Sync {
    fn append(&self, event: &DetectionEvent) -> Result<()>;
}

/// A sink behind an `Arc` is still a sink, so callers can keep a handle
/// on the one they hand out.
impl<S: AuditSink + ?Sized> AuditSink for std::sync::Arc<S> {
    fn append(&self, event: &DetectionEvent) -> Result<()> {
        (**self).append(event)
    }
}
