//! Two-phase scanning pipeline
//!
//! A [`Guard`] scans prompt text before it reaches a model and response text
//! before it reaches the caller. Each phase is scanned, redacted and written
//! to the audit sink as one [`DetectionEvent`].

pub mod error;

use std::sync::Arc;

use scrub_audit::{AuditSink, JsonlAuditor, MemoryAuditor};
use scrub_config::Config;
use scrub_core::{DetectionEvent, FileVaultLoader, Phase, Vault, VaultLoader};
use scrub_security::{
    Detector, ExactDetector, PatternDetector, Redactor, ScanEngine, ScanReport, builtin_patterns,
};

pub use error::{GuardError, Result};

/// Outcome of inspecting one text.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub phase: Phase,
    /// Text with every detected span replaced by the redaction token.
    pub redacted: String,
    pub report: ScanReport,
}

impl Inspection {
    pub fn was_redacted(&self) -> bool {
        !self.report.matches.is_empty()
    }
}

/// Scans, redacts and audits text on both sides of a model call.
///
/// Safe to share between threads: the vault is read-only and the audit
/// sink serializes its own appends. Callers that need input and output
/// events of one exchange in order should inspect them in that order.
pub struct Guard {
    vault: Arc<Vault>,
    engine: ScanEngine,
    redactor: Redactor,
    auditor: Arc<dyn AuditSink>,
    preview_chars: usize,
}

impl Guard {
    pub fn builder(vault: impl Into<Arc<Vault>>) -> GuardBuilder {
        GuardBuilder::new(vault.into())
    }

    /// Wire a guard from configuration: load the vault, register the exact
    /// and pattern detectors, and append audit records to the configured file.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(GuardError::Config)?;

        let mut vault = match &config.vault.path {
            Some(path) => FileVaultLoader::new(path).load()?,
            None => Vault::empty(),
        };
        if config.vault.builtin_patterns {
            vault = vault.merged_under(&builtin_patterns());
        }

        let mut builder = Guard::builder(vault)
            .redactor(
                Redactor::new()
                    .with_token(config.redaction.token.clone())
                    .with_policy(config.redaction.overlap),
            )
            .auditor(JsonlAuditor::new(&config.audit.path))
            .preview_chars(config.audit.preview_chars);

        let exact = &config.scan.exact_categories;
        if !exact.is_empty() {
            builder = builder.detector(ExactDetector::new(exact.iter().cloned()));
        }
        if config.scan.patterns {
            builder = builder.detector(PatternDetector::new());
        }

        Ok(builder.build())
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn detector_names(&self) -> Vec<&str> {
        self.engine.detector_names()
    }

    /// Scan and redact without writing an audit record.
    pub fn scan(&self, text: &str) -> (String, ScanReport) {
        let report = self.engine.scan(text, &self.vault);
        let redacted = self.redactor.redact(text, &report.matches);
        (redacted, report)
    }

    /// Scan, redact and audit `text` for `phase`.
    ///
    /// Fails only if the audit record cannot be written; detector problems
    /// are reported in [`ScanReport::warnings`].
    pub fn inspect(&self, phase: Phase, text: &str) -> Result<Inspection> {
        let (redacted, report) = self.scan(text);
        let preview = self.preview_chars;

        let event = DetectionEvent::new(phase, &report.matches, text, &redacted, preview);
        self.auditor.append(&event)?;

        tracing::info!(
            phase = %phase,
            matches = report.matches.len(),
            degraded = report.is_degraded(),
            "Inspected text"
        );

        Ok(Inspection {
            phase,
            redacted,
            report,
        })
    }

    /// Inspect a prompt before it is sent to the model.
    pub fn inspect_input(&self, text: &str) -> Result<Inspection> {
        self.inspect(Phase::Input, text)
    }

    /// Inspect a model response before it is returned.
    pub fn inspect_output(&self, text: &str) -> Result<Inspection> {
        self.inspect(Phase::Output, text)
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("engine", &self.engine)
            .field("redactor", &self.redactor)
            .field("preview_chars", &self.preview_chars)
            .finish_non_exhaustive()
    }
}

pub struct GuardBuilder {
    vault: Arc<Vault>,
    engine: ScanEngine,
    redactor: Redactor,
    auditor: Option<Arc<dyn AuditSink>>,
    preview_chars: usize,
}

impl GuardBuilder {
    fn new(vault: Arc<Vault>) -> Self {
        Self {
            vault,
            engine: ScanEngine::new(),
            redactor: Redactor::new(),
            auditor: None,
            preview_chars: 200,
        }
    }

    /// Append a detector; detectors run in the order they are added.
    pub fn detector(mut self, detector: impl Detector + 'static) -> Self {
        self.engine.add_detector(Box::new(detector));
        self
    }

    pub fn redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn auditor(mut self, auditor: impl AuditSink + 'static) -> Self {
        self.auditor = Some(Arc::new(auditor));
        self
    }

    pub fn shared_auditor(mut self, auditor: Arc<dyn AuditSink>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    pub fn preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// Without an explicit sink, records go to an in-memory auditor.
    pub fn build(self) -> Guard {
        let auditor: Arc<dyn AuditSink> = match self.auditor {
            Some(auditor) => auditor,
            None => Arc::new(MemoryAuditor::new()),
        };
        Guard {
            vault: self.vault,
            engine: self.engine,
            redactor: self.redactor,
            auditor,
            preview_chars: self.preview_chars,
        }
    }
}
