//! Detector trait and the built-in exact and pattern detectors

use std::collections::HashMap;
use std::sync::RwLock;

use regex::{Regex, RegexBuilder};
use scrub_core::{DetectorError, Match, MatchKind, PatternError, Span, Vault};

/// Compiled-size ceiling for vault patterns (bytes).
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Output of a single detector run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    /// Matches in discovery order.
    pub matches: Vec<Match>,
    /// Patterns that were skipped because they failed to compile.
    pub skipped: Vec<PatternError>,
}

impl Detection {
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            matches,
            skipped: Vec::new(),
        }
    }
}

/// A pluggable unit of detection.
///
/// Implementations must treat `text` and `vault` as read-only and return
/// spans that index `text` exactly. Classifier-backed detectors implement
/// this trait as adapters and report failures through [`DetectorError`].
pub trait Detector: Send + Sync {
    /// Stable name used in warnings and logs.
    fn name(&self) -> &str;

    fn detect(&self, text: &str, vault: &Vault) -> Result<Detection, DetectorError>;
}

/// Finds every verbatim occurrence of the literals in the configured
/// vault categories.
#[derive(Debug, Clone)]
pub struct ExactDetector {
    categories: Vec<String>,
}

impl ExactDetector {
    /// Duplicate category names are ignored; first position wins.
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for category in categories {
            let category = category.into();
            if !unique.contains(&category) {
                unique.push(category);
            }
        }
        Self { categories: unique }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

impl Detector for ExactDetector {
    fn name(&self) -> &str {
        "exact"
    }

    fn detect(&self, text: &str, vault: &Vault) -> Result<Detection, DetectorError> {
        let mut matches = Vec::new();

        for category in &self.categories {
            for literal in vault.list_for(category) {
                // An empty literal would match between every character
                if literal.is_empty() {
                    continue;
                }
                // match_indices resumes after each hit, so a literal never overlaps itself
                for (start, found) in text.match_indices(literal.as_str()) {
                    matches.push(Match::new(
                        MatchKind::Exact,
                        category.as_str(),
                        found,
                        Span::new(start, start + found.len()),
                    ));
                }
            }
        }

        Ok(Detection::new(matches))
    }
}

/// Runs every named pattern in the vault with leftmost-first semantics.
///
/// A pattern that fails to compile is reported in [`Detection::skipped`]
/// and the remaining patterns still run. Empty matches are dropped since
/// they cannot be redacted.
#[derive(Debug)]
pub struct PatternDetector {
    size_limit: usize,
    cache: RwLock<HashMap<String, CompiledPattern>>,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    compiled: Result<Regex, String>,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self::with_size_limit(DEFAULT_REGEX_SIZE_LIMIT)
    }

    pub fn with_size_limit(size_limit: usize) -> Self {
        Self {
            size_limit,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn compile(&self, name: &str, source: &str) -> Result<Regex, String> {
        if let Ok(cache) = self.cache.read()
            && let Some(entry) = cache.get(name)
            && entry.source == source
        {
            return entry.compiled.clone();
        }

        let compiled = RegexBuilder::new(source)
            .size_limit(self.size_limit)
            .build()
            .map_err(|e| e.to_string());

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(
                name.to_string(),
                CompiledPattern {
                    source: source.to_string(),
                    compiled: compiled.clone(),
                },
            );
        }

        compiled
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for PatternDetector {
    fn name(&self) -> &str {
        "pattern"
    }

    fn detect(&self, text: &str, vault: &Vault) -> Result<Detection, DetectorError> {
        let mut detection = Detection::default();

        for (name, source) in vault.patterns_all() {
            let regex = match self.compile(name, source) {
                Ok(regex) => regex,
                Err(message) => {
                    detection.skipped.push(PatternError {
                        name: name.clone(),
                        message,
                    });
                    continue;
                }
            };

            for found in regex.find_iter(text) {
                if found.is_empty() {
                    continue;
                }
                detection.matches.push(Match::new(
                    MatchKind::Pattern,
                    name.as_str(),
                    found.as_str(),
                    Span::new(found.start(), found.end()),
                ));
            }
        }

        Ok(detection)
    }
}
