//! Global-to-line-local offset mapping.

use crate::error::{Error, Result};
use crate::label::CharSpan;
use crate::line::LocalSpan;

/// A label span resolved to a line and line-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// 0-based index of the owning line.
    pub line: usize,
    /// Line-local inclusive span.
    pub local: LocalSpan,
}

/// Resolve a global char span to a line index and line-local coordinates.
///
/// Lines are described by their char lengths only, so callers can pass a
/// cheap length view instead of line text. Both endpoints are located
/// independently against the same boundaries, by walking the lengths and
/// subtracting until the remaining counter falls inside a line. Offsets
/// past the last line resolve to the last line with oversized local
/// coordinates; those surface later as a glyph-lookup failure at draw time
/// rather than here.
///
/// # Errors
///
/// Returns [`Error::OutOfRangeLabel`] when the local start ends up past the
/// local end (the two endpoints mapped to different lines after an upstream
/// truncation inconsistency, or the input offsets are malformed), or when
/// there are no lines at all.
pub fn locate(id: u32, span: CharSpan, line_lens: &[usize]) -> Result<Placement> {
    let out_of_range = Error::OutOfRangeLabel {
        id,
        start: span.start,
        end: span.end,
    };
    if line_lens.is_empty() {
        return Err(out_of_range);
    }

    let mut line_idx = 0;
    let mut start = span.start;
    for (i, &len) in line_lens.iter().enumerate() {
        line_idx = i;
        if start < len {
            break;
        }
        start -= len;
    }

    let mut end = span.end;
    for &len in line_lens {
        if end < len {
            break;
        }
        end -= len;
    }

    if start > end {
        return Err(out_of_range);
    }
    Ok(Placement {
        line: line_idx,
        local: LocalSpan::new(start, end),
    })
}
