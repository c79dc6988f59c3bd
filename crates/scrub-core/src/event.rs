use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::matches::{Match, MatchSet};

/// Which side of the model call a text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Prompt text on its way to the model.
    Input,
    /// Model response on its way back to the caller.
    Output,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Input => "input",
            Phase::Output => "output",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the redactor treats matches whose spans overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Apply replacements back-to-front against the edited string and skip
    /// any span that no longer fits it.
    #[default]
    Skip,
    /// Merge overlapping spans of the original text into single ranges
    /// before replacing.
    Merge,
}

/// One audit record, written once per scanned phase.
///
/// Previews are bounded prefixes of the original and redacted text. The
/// original preview is not redacted, so a secret that falls inside the
/// preview window is written to the audit log as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEvent {
    #[serde(with = "time::serde::timestamp")]
    pub timestamp: OffsetDateTime,
    pub phase: Phase,
    pub matches: Vec<Match>,
    pub was_redacted: bool,
    pub original_preview: String,
    pub redacted_preview: String,
}

impl DetectionEvent {
    /// Build an event stamped with the current UTC time.
    pub fn new(
        phase: Phase,
        matches: &MatchSet,
        original: &str,
        redacted: &str,
        preview_chars: usize,
    ) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            phase,
            matches: matches.as_slice().to_vec(),
            was_redacted: !matches.is_empty(),
            original_preview: preview(original, preview_chars),
            redacted_preview: preview(redacted, preview_chars),
        }
    }

    pub fn with_timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Serialize as a single JSON line, without the trailing newline.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// First `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::{MatchKind, Span};

    #[test]
    fn test_preview_truncates_on_chars() {
        assert_eq!(preview("hello", 3), "hel");
        assert_eq!(preview("hello", 10), "hello");
        assert_eq!(preview("ééé", 2), "éé");
        assert_eq!(preview("", 5), "");
    }

    #[test]
    fn test_event_json_field_names() {
        let m = Match::new(MatchKind::Exact, "api_keys", "sk-1", Span::new(4, 8));
        let matches = MatchSet::from(vec![m]);
        let redacted = "key [REDACTED]";
        let event = DetectionEvent::new(Phase::Input, &matches, "key sk-1", redacted, 200)
            .with_timestamp(OffsetDateTime::UNIX_EPOCH);

        let line = event.to_json_line().unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["timestamp"], 0);
        assert_eq!(value["phase"], "input");
        assert_eq!(value["wasRedacted"], true);
        assert_eq!(value["originalPreview"], "key sk-1");
        assert_eq!(value["redactedPreview"], "key [REDACTED]");
        assert_eq!(value["matches"][0]["span"], serde_json::json!([4, 8]));
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_event_without_matches_is_not_redacted() {
        let matches = MatchSet::new();
        let event = DetectionEvent::new(Phase::Output, &matches, "clean", "clean", 200);
        assert!(!event.was_redacted);
        assert!(event.matches.is_empty());
    }

    #[test]
    fn test_overlap_policy_names() {
        let json = serde_json::to_string(&OverlapPolicy::Skip).unwrap();
        assert_eq!(json, "\"skip\"");
        assert_eq!(OverlapPolicy::default(), OverlapPolicy::Skip);
    }
}
