//! Span-based redaction

use scrub_core::{Match, MatchSet, OverlapPolicy, Span};

pub const DEFAULT_REDACTION_TOKEN: &str = "[REDACTED]";

/// Replaces matched spans with a fixed token.
///
/// Spans always refer to the text as it was scanned. Replacements are
/// applied right-to-left so offsets left of the edit point stay valid.
///
/// With [`OverlapPolicy::Skip`] each span is checked against the string as
/// edited so far and skipped if it no longer fits (out of bounds or off a
/// char boundary). Overlapping spans are therefore not fully handled: a
/// lower-starting span that still fits after a later replacement is applied
/// to the edited string. [`OverlapPolicy::Merge`] folds overlapping spans
/// into one range first, so every matched byte is covered by exactly one
/// token.
#[derive(Debug, Clone)]
pub struct Redactor {
    token: String,
    policy: OverlapPolicy,
}

impl Redactor {
    pub fn new() -> Self {
        Self {
            token: DEFAULT_REDACTION_TOKEN.to_string(),
            policy: OverlapPolicy::Skip,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Redact every match in `matches` from `text`.
    pub fn redact(&self, text: &str, matches: &MatchSet) -> String {
        self.redact_matches(text, matches.as_slice())
    }

    pub fn redact_matches(&self, text: &str, matches: &[Match]) -> String {
        if matches.is_empty() {
            return text.to_string();
        }

        let spans: Vec<Span> = matches.iter().map(|m| m.span).collect();
        match self.policy {
            OverlapPolicy::Skip => self.apply_sequential(text, spans),
            OverlapPolicy::Merge => self.apply_merged(text, spans),
        }
    }

    fn apply_sequential(&self, text: &str, mut spans: Vec<Span>) -> String {
        // Descending start, then descending end so the wider span goes first
        spans.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

        let mut out = text.to_string();
        for span in spans {
            if !span.fits(&out) {
                tracing::debug!(start = span.start, end = span.end, "Skipping span");
                continue;
            }
            out.replace_range(span.start..span.end, &self.token);
        }
        out
    }

    fn apply_merged(&self, text: &str, mut spans: Vec<Span>) -> String {
        spans.retain(|span| {
            let fits = span.fits(text);
            if !fits {
                tracing::debug!(start = span.start, end = span.end, "Skipping span");
            }
            fits
        });
        spans.sort();

        let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start < last.end => last.end = last.end.max(span.end),
                _ => merged.push(span),
            }
        }

        let mut out = text.to_string();
        for span in merged.iter().rev() {
            out.replace_range(span.start..span.end, &self.token);
        }
        out
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}
