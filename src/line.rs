//! Display lines and line-local label placements.

use crate::label::{Label, Relation};
use serde::{Deserialize, Serialize};

/// A segmented slice of the document before labels are attached:
/// the line's text plus the global char offset of its first character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLine {
    /// Global char offset of the first character.
    pub start: usize,
    /// Line text, newline characters normalized to spaces.
    pub text: String,
}

impl RawLine {
    /// Create a raw line.
    #[must_use]
    pub fn new(start: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            text: text.into(),
        }
    }

    /// Length in characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// An inclusive span of line-local character offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSpan {
    pub start: usize,
    pub end: usize,
}

impl LocalSpan {
    /// Create a local span.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A label attached to a line.
///
/// `local` is `None` for malformed labels: quarantined to line 0 at a
/// sentinel position, kept for `dump` but never drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLabel {
    pub label: Label,
    pub local: Option<LocalSpan>,
}

impl PlacedLabel {
    /// A label placed at line-local coordinates.
    #[must_use]
    pub fn at(label: Label, local: LocalSpan) -> Self {
        Self {
            label,
            local: Some(local),
        }
    }

    /// A malformed label at the sentinel position.
    #[must_use]
    pub fn sentinel(label: Label) -> Self {
        Self { label, local: None }
    }

    /// Whether the label can be drawn.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.local.is_some()
    }
}

/// One unit of displayed text with its attached labels and relations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// 0-based sequence position.
    pub index: usize,
    /// Global char offset of the first character.
    pub start: usize,
    /// Line text.
    pub text: String,
    /// Labels whose whole span falls inside this line, in input order,
    /// plus (on line 0) any malformed labels at the sentinel position.
    pub labels: Vec<PlacedLabel>,
    /// Relations drawn on this line: the later of each relation's two
    /// endpoint lines.
    pub relations: Vec<Relation>,
}

impl Line {
    /// Create a line from a segmented raw slice.
    #[must_use]
    pub fn from_raw(index: usize, raw: RawLine) -> Self {
        Self {
            index,
            start: raw.start,
            text: raw.text,
            labels: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Length in characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}
