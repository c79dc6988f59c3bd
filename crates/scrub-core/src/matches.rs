use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` byte range into a scanned text.
///
/// Serialized as a two-element array `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when the two spans share at least one position.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `start < end <= text.len()` and both ends sit on char boundaries.
    pub fn fits(&self, text: &str) -> bool {
        self.start < self.end
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl From<Span> for (usize, usize) {
    fn from(span: Span) -> Self {
        (span.start, span.end)
    }
}

/// Which kind of detector produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Verbatim literal from a vault exact set.
    Exact,
    /// Named regular expression from the vault.
    Pattern,
    /// Opaque classifier-backed plug-in.
    Classifier,
}

/// A single detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub kind: MatchKind,
    /// Category or pattern name that produced the match.
    pub key: String,
    /// The exact substring found at `span`.
    pub text: String,
    pub span: Span,
}

impl Match {
    pub fn new(
        kind: MatchKind,
        key: impl Into<String>,
        text: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            key: key.into(),
            text: text.into(),
            span,
        }
    }

    /// Check that this match refers to exactly `self.text` inside `source`.
    pub fn is_valid_for(&self, source: &str) -> bool {
        self.span.fits(source) && source[self.span.start..self.span.end] == self.text
    }
}

/// Deduplicated matches from one scan, keyed by `(span, text)`.
///
/// When two matches share a key, the first one inserted is kept and later
/// ones are dropped, so the retained `kind`/`key` come from the earliest
/// detector in scan order. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Match>", into = "Vec<Match>")]
pub struct MatchSet {
    items: Vec<Match>,
    seen: HashSet<(Span, String)>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a match. Returns `false` if an entry with the same span and
    /// text is already present, in which case the set is unchanged.
    pub fn insert(&mut self, m: Match) -> bool {
        if !self.seen.insert((m.span, m.text.clone())) {
            return false;
        }
        self.items.push(m);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Match] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Match> {
        self.items
    }
}

impl FromIterator<Match> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Match>>(iter: I) -> Self {
        let mut set = MatchSet::new();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

impl Extend<Match> for MatchSet {
    fn extend<I: IntoIterator<Item = Match>>(&mut self, iter: I) {
        for m in iter {
            self.insert(m);
        }
    }
}

impl From<Vec<Match>> for MatchSet {
    fn from(items: Vec<Match>) -> Self {
        items.into_iter().collect()
    }
}

impl From<MatchSet> for Vec<Match> {
    fn from(set: MatchSet) -> Self {
        set.items
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for MatchSet {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
