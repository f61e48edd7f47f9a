//! Label, category and relation data types.
//!
//! These are the wire shapes of [`Annotator::import`](crate::Annotator::import)
//! and [`Annotator::dump`](crate::Annotator::dump): labels tag an inclusive
//! global character range with a category code, relations are directed labeled
//! edges between two labels.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// An inclusive span of global character offsets.
///
/// Serializes as the two-element `pos` array (`[start, end]`) used by the
/// import/dump wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

impl CharSpan {
    /// Create a new span. Both endpoints are inclusive.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered (inclusive endpoints).
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    /// Whether the span is well formed (`start <= end`).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Whether a global offset falls inside the span.
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// Whether cutting a line after `trunc_pos` (inclusive) would bisect
    /// this span: the span starts at or before the cut but ends past it.
    #[must_use]
    pub fn straddles(&self, trunc_pos: usize) -> bool {
        self.start <= trunc_pos && trunc_pos < self.end
    }
}

impl From<[usize; 2]> for CharSpan {
    fn from(pos: [usize; 2]) -> Self {
        Self::new(pos[0], pos[1])
    }
}

impl From<CharSpan> for [usize; 2] {
    fn from(span: CharSpan) -> Self {
        [span.start, span.end]
    }
}

/// An entity annotation: a categorized character range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: u32,
    pub category: u32,
    pub pos: CharSpan,
}

impl Label {
    /// Create a new label.
    #[must_use]
    pub fn new(id: u32, category: u32, pos: CharSpan) -> Self {
        Self { id, category, pos }
    }
}

/// A category legend entry mapping a category code to its display text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub text: String,
}

impl Category {
    /// Create a new category.
    #[must_use]
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// A directed, labeled edge between two labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub src: u32,
    pub dst: u32,
    pub text: String,
}

impl Relation {
    /// Create a new relation.
    #[must_use]
    pub fn new(src: u32, dst: u32, text: impl Into<String>) -> Self {
        Self {
            src,
            dst,
            text: text.into(),
        }
    }
}

/// Validate the label sort-order contract once, at import time.
///
/// The segmenter's truncation scan keeps a monotonic sentinel into the label
/// sequence and is only correct when labels are sorted by span start. The
/// precondition is an explicit input contract rather than an implicit
/// assumption baked into the scan.
pub fn ensure_sorted_by_start(labels: &[Label]) -> Result<()> {
    for (index, pair) in labels.windows(2).enumerate() {
        if pair[1].pos.start < pair[0].pos.start {
            return Err(Error::UnsortedLabels { index: index + 1 });
        }
    }
    Ok(())
}
