//! Error types for annoline.

use crate::render::RenderState;
use std::fmt;

/// Result type alias for annoline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for annoline operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Segmentation made no progress within its iteration cap.
    ///
    /// Indicates structurally inconsistent input: overlapping labels, or a
    /// label wider than the maximum slice length that can never fit a line.
    SegmentationDeadlock { iterations: usize },
    /// Labels were not sorted by span start at import time.
    UnsortedLabels { index: usize },
    /// A label's global span did not map onto one line at coherent
    /// line-local coordinates. Per-item: the label is quarantined.
    OutOfRangeLabel { id: u32, start: usize, end: usize },
    /// `import` was called while a render cycle was in flight.
    ConcurrentImport,
    /// `start` was called in a state other than `Init`.
    InvalidStart { state: RenderState },
    /// The surface had no glyph at the requested line-local offset.
    /// Per-draw: the label is skipped.
    GlyphIndex { line: usize, offset: usize },
    /// The injected drawing surface reported a failure.
    Surface(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SegmentationDeadlock { iterations } => {
                write!(
                    f,
                    "segmentation made no progress after {iterations} iterations"
                )
            }
            Self::UnsortedLabels { index } => {
                write!(
                    f,
                    "label at index {index} breaks the start-offset sort order"
                )
            }
            Self::OutOfRangeLabel { id, start, end } => {
                write!(f, "label {id} span [{start}, {end}] does not map onto a line")
            }
            Self::ConcurrentImport => {
                write!(f, "cannot import while a render cycle is in flight")
            }
            Self::InvalidStart { state } => {
                write!(
                    f,
                    "render can only start from Init, current state is {state:?}"
                )
            }
            Self::GlyphIndex { line, offset } => {
                write!(f, "no glyph at offset {offset} of line {line}")
            }
            Self::Surface(msg) => write!(f, "surface error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
