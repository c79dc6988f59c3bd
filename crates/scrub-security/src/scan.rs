//! Scan engine: runs detectors in order, validates and deduplicates their matches

use std::panic::{AssertUnwindSafe, catch_unwind};

use scrub_core::{DetectorError, MatchSet, PatternError, Vault};

use crate::detector::Detector;

/// Non-fatal problem encountered during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    /// A pattern failed to compile and was not applied.
    PatternSkipped {
        detector: String,
        error: PatternError,
    },
    /// A detector failed or returned unusable output.
    DetectorFailed(DetectorError),
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanWarning::PatternSkipped { detector, error } => write!(f, "{detector}: {error}"),
            ScanWarning::DetectorFailed(error) => write!(f, "{error}"),
        }
    }
}

/// Result of a scan. Always carries whatever the healthy detectors found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub matches: MatchSet,
    pub warnings: Vec<ScanWarning>,
    /// Matches produced before deduplication.
    pub raw_matches: usize,
    pub detectors_run: usize,
    pub detectors_failed: usize,
}

impl ScanReport {
    /// True when coverage was reduced: a detector failed, a pattern was
    /// skipped, or a detector's match was dropped for an invalid span.
    pub fn is_degraded(&self) -> bool {
        self.detectors_failed > 0 || !self.warnings.is_empty()
    }
}

/// Run `detectors` in order over `text` and merge their output.
///
/// Raw matches are concatenated in detector order, then discovery order,
/// and deduplicated by `(span, text)` keeping the first one seen. A
/// detector that errors or panics is skipped and counted in
/// [`ScanReport::detectors_failed`]. Matches whose span does not index
/// their text exactly are dropped with a warning.
pub fn scan(text: &str, vault: &Vault, detectors: &[Box<dyn Detector>]) -> ScanReport {
    let mut report = ScanReport::default();

    for detector in detectors {
        report.detectors_run += 1;
        let name = detector.name().to_string();

        let outcome = catch_unwind(AssertUnwindSafe(|| detector.detect(text, vault)))
            .unwrap_or_else(|payload| {
                Err(DetectorError::Panicked {
                    detector: name.clone(),
                    message: panic_message(payload.as_ref()),
                })
            });

        let detection = match outcome {
            Ok(detection) => detection,
            Err(error) => {
                tracing::warn!(
                    detector = %name,
                    error = %error,
                    "Detector failed, continuing scan"
                );
                report.detectors_failed += 1;
                report.warnings.push(ScanWarning::DetectorFailed(error));
                continue;
            }
        };

        for error in detection.skipped {
            tracing::warn!(detector = %name, error = %error, "Skipping pattern");
            report.warnings.push(ScanWarning::PatternSkipped {
                detector: name.clone(),
                error,
            });
        }

        for m in detection.matches {
            if !m.is_valid_for(text) {
                let error = DetectorError::InvalidSpan {
                    detector: name.clone(),
                    start: m.span.start,
                    end: m.span.end,
                };
                tracing::warn!(detector = %name, error = %error, "Dropping match");
                report.warnings.push(ScanWarning::DetectorFailed(error));
                continue;
            }
            report.raw_matches += 1;
            report.matches.insert(m);
        }
    }

    tracing::debug!(
        raw = report.raw_matches,
        unique = report.matches.len(),
        failed = report.detectors_failed,
        "Scan complete"
    );

    report
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Ordered list of detectors applied as one scan.
#[derive(Default)]
pub struct ScanEngine {
    detectors: Vec<Box<dyn Detector>>,
}

impl ScanEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(mut self, detector: impl Detector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    pub fn add_detector(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn scan(&self, text: &str, vault: &Vault) -> ScanReport {
        scan(text, vault, &self.detectors)
    }
}

impl std::fmt::Debug for ScanEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanEngine")
            .field("detectors", &self.detector_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{Detection, ExactDetector, PatternDetector};
    use scrub_core::{Match, MatchKind, Span};

    const EMAIL: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

    /// Emits fixed matches under its own name.
    struct FixedDetector {
        name: &'static str,
        matches: Vec<Match>,
    }

    impl Detector for FixedDetector {
        fn name(&self) -> &str {
            self.name
        }

        fn detect(&self, _text: &str, _vault: &Vault) -> Result<Detection, DetectorError> {
            Ok(Detection::new(self.matches.clone()))
        }
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn name(&self) -> &str {
            "toxicity"
        }

        fn detect(&self, _text: &str, _vault: &Vault) -> Result<Detection, DetectorError> {
            Err(DetectorError::failed("toxicity", "model server unreachable"))
        }
    }

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn name(&self) -> &str {
            "prompt_injection"
        }

        fn detect(&self, _text: &str, _vault: &Vault) -> Result<Detection, DetectorError> {
            panic!("classifier exploded")
        }
    }

    #[test]
    fn test_exact_and_pattern_scan() {
        let vault = Vault::builder()
            .exact_set("api_keys", ["sk-live-abc123"])
            .pattern("emails", EMAIL)
            .build();
        let engine = ScanEngine::new()
            .with_detector(ExactDetector::new(["api_keys", "emails"]))
            .with_detector(PatternDetector::new());

        let report = engine.scan(
            "Please email admin@example.com. My API key is sk-live-abc123.",
            &vault,
        );

        assert_eq!(report.matches.len(), 2);
        assert_eq!(report.detectors_run, 2);
        assert!(!report.is_degraded());
        let keys: Vec<&str> = report.matches.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["api_keys", "emails"]);
    }

    #[test]
    fn test_first_detector_wins_on_collision() {
        let text = "admin@example.com";
        let vault = Vault::builder()
            .exact_set("emails", ["admin@example.com"])
            .pattern("contact", EMAIL)
            .build();
        let engine = ScanEngine::new()
            .with_detector(PatternDetector::new())
            .with_detector(ExactDetector::new(["emails"]));

        let report = engine.scan(text, &vault);

        assert_eq!(report.raw_matches, 2);
        assert_eq!(report.matches.len(), 1);
        let kept = &report.matches.as_slice()[0];
        assert_eq!(kept.key, "contact");
        assert_eq!(kept.kind, MatchKind::Pattern);
    }

    #[test]
    fn test_plugin_match_kept_over_later_exact() {
        let person = Match::new(MatchKind::Classifier, "person", "ab", Span::new(0, 2));
        let classifier = FixedDetector {
            name: "ner",
            matches: vec![person],
        };
        let vault = Vault::builder().exact_set("names", ["ab"]).build();
        let engine = ScanEngine::new()
            .with_detector(classifier)
            .with_detector(ExactDetector::new(["names"]));

        let report = engine.scan("ab", &vault);

        assert_eq!(report.raw_matches, 2);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches.as_slice()[0].kind, MatchKind::Classifier);
        assert_eq!(report.matches.as_slice()[0].key, "person");
    }

    #[test]
    fn test_failing_detector_does_not_abort() {
        let vault = Vault::builder().exact_set("api_keys", ["sk-1"]).build();
        let engine = ScanEngine::new()
            .with_detector(FailingDetector)
            .with_detector(ExactDetector::new(["api_keys"]));

        let report = engine.scan("key sk-1", &vault);

        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.detectors_failed, 1);
        assert!(report.is_degraded());
        let ScanWarning::DetectorFailed(error) = &report.warnings[0] else {
            panic!("unexpected warning: {:?}", report.warnings[0]);
        };
        assert!(matches!(error, DetectorError::Failed { .. }));
        assert_eq!(error.detector(), "toxicity");
    }

    #[test]
    fn test_panicking_detector_is_isolated() {
        let vault = Vault::builder().exact_set("api_keys", ["sk-1"]).build();
        let engine = ScanEngine::new()
            .with_detector(PanickingDetector)
            .with_detector(ExactDetector::new(["api_keys"]));

        let report = engine.scan("key sk-1", &vault);

        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.detectors_failed, 1);
        match &report.warnings[0] {
            ScanWarning::DetectorFailed(DetectorError::Panicked { detector, message }) => {
                assert_eq!(detector, "prompt_injection");
                assert_eq!(message, "classifier exploded");
            }
            other => panic!("unexpected warning: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_spans_are_dropped() {
        let detector = FixedDetector {
            name: "sloppy",
            matches: vec![
                Match::new(MatchKind::Classifier, "x", "abc", Span::new(0, 3)),
                Match::new(MatchKind::Classifier, "x", "zzz", Span::new(0, 3)),
                Match::new(MatchKind::Classifier, "x", "abc", Span::new(2, 40)),
            ],
        };
        let engine = ScanEngine::new().with_detector(detector);

        let report = engine.scan("abcdef", &Vault::empty());

        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.detectors_failed, 0);
        assert!(report.is_degraded());
    }

    #[test]
    fn test_skipped_pattern_reported() {
        let vault = Vault::builder()
            .pattern("bad", "[")
            .pattern("digits", r"\d+")
            .build();

        let report = ScanEngine::new()
            .with_detector(PatternDetector::new())
            .scan("pin 1234", &vault);

        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.detectors_failed, 0);
        assert!(matches!(
            &report.warnings[0],
            ScanWarning::PatternSkipped { error, .. } if error.name == "bad"
        ));
    }

    #[test]
    fn test_no_detectors_returns_empty() {
        let report = scan("anything at all", &Vault::empty(), &[]);
        assert!(report.matches.is_empty());
        assert_eq!(report.detectors_run, 0);
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_all_failing_returns_empty_but_degraded() {
        let failing: Box<dyn Detector> = Box::new(FailingDetector);
        let panicking: Box<dyn Detector> = Box::new(PanickingDetector);

        let report = scan("text", &Vault::empty(), &[failing, panicking]);
        assert!(report.matches.is_empty());
        assert_eq!(report.detectors_failed, 2);
        assert!(report.is_degraded());
    }
}
