//! Truncation-safe document segmentation.
//!
//! Splits raw text into display lines bounded by sentence-terminal
//! punctuation and a maximum slice length, then adjusts each cut so that no
//! label span is ever bisected by a line boundary. Characters are never
//! discarded: anything pulled back from a cut is deferred to the next
//! pending slice.
//!
//! The truncation scan assumes labels are sorted by span start (validated at
//! import, see [`crate::label::ensure_sorted_by_start`]) and keeps a
//! monotonic sentinel index into the label sequence so the whole pass stays
//! linear in the number of labels.

use crate::error::{Error, Result};
use crate::label::Label;
use crate::line::RawLine;
use ropey::Rope;
use std::collections::VecDeque;

/// Outer-loop iteration cap for segmentation.
///
/// Segmentation must make progress every iteration; spinning past this cap
/// means the input is structurally inconsistent (for example a label wider
/// than the maximum slice length, which can never fit on one line).
pub const MAX_SEGMENT_ITERATIONS: usize = 100_000;

/// Characters that terminate a coarse slice.
fn is_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '。')
}

/// Coarse split: break the document at sentence terminators, keeping each
/// terminator with its slice. Line breaks are normalized to spaces so char
/// counts are preserved.
fn coarse_split(raw: &Rope) -> VecDeque<Vec<char>> {
    let mut slices = VecDeque::new();
    let mut current = Vec::new();
    for c in raw.chars() {
        if is_terminator(c) {
            current.push(if c == '。' { c } else { ' ' });
            slices.push_back(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        slices.push_back(current);
    }
    slices
}

/// Prepend characters onto the head of the pending queue.
///
/// Matches the source-of-truth behavior: deferred text merges into the next
/// pending slice rather than forming a slice of its own, so a later cut sees
/// the full remaining run of characters.
fn prepend(pending: &mut VecDeque<Vec<char>>, mut chars: Vec<char>) {
    if chars.is_empty() {
        return;
    }
    if let Some(head) = pending.front_mut() {
        chars.append(head);
        *head = chars;
    } else {
        pending.push_back(chars);
    }
}

/// Split the document into display lines that never bisect a label span.
///
/// `labels` must be sorted by span start. Each returned [`RawLine`] carries
/// the global char offset of its first character; concatenating the lines in
/// order reproduces the document with line breaks normalized to spaces.
///
/// # Errors
///
/// Returns [`Error::SegmentationDeadlock`] when no valid cut can be found
/// within the iteration cap.
pub fn segment(raw: &Rope, labels: &[Label], max_slice_len: usize) -> Result<Vec<RawLine>> {
    let max_slice_len = max_slice_len.max(1);
    let mut pending = coarse_split(raw);
    let mut lines = Vec::new();
    let mut base_pos = 0usize;
    let mut sentinel = 0usize;
    let mut iterations = 0usize;

    while let Some(mut slice) = pending.pop_front() {
        iterations += 1;
        if iterations > MAX_SEGMENT_ITERATIONS {
            return Err(Error::SegmentationDeadlock {
                iterations: MAX_SEGMENT_ITERATIONS,
            });
        }
        if slice.is_empty() {
            continue;
        }
        if slice.len() > max_slice_len {
            let rest = slice.split_off(max_slice_len);
            prepend(&mut pending, rest);
        }

        // Tentative cut: last char of the slice, inclusive. Pull it back
        // until no label straddles it. A pull-back can expose an earlier
        // straddling label, so re-scan from the same sentinel until a pass
        // finds none.
        let mut trunc_pos = base_pos + slice.len() - 1;
        let mut deferred = false;
        'rescan: loop {
            if sentinel >= labels.len() {
                break;
            }
            let mut i = sentinel;
            let mut pulled = false;
            while i < labels.len() {
                let span = labels[i].pos;
                if span.start > trunc_pos {
                    break;
                }
                if span.straddles(trunc_pos) {
                    pulled = true;
                    if span.start <= base_pos {
                        // The whole slice sits inside a protected region:
                        // no cut is possible here.
                        deferred = true;
                        break 'rescan;
                    }
                    trunc_pos = span.start - 1;
                }
                i += 1;
            }
            if !pulled {
                sentinel = i;
                break;
            }
        }

        if deferred {
            if pending.is_empty() {
                // The offending label runs past end-of-document; emit the
                // tail as a final line and let offset mapping quarantine it.
                let text: String = slice.iter().collect();
                let start = base_pos;
                base_pos += slice.len();
                lines.push(RawLine::new(start, text));
            } else {
                prepend(&mut pending, slice);
            }
            continue;
        }

        let trunc_offset = trunc_pos - base_pos + 1;
        let rest = slice.split_off(trunc_offset);
        prepend(&mut pending, rest);
        let text: String = slice.iter().collect();
        let start = base_pos;
        base_pos += slice.len();
        lines.push(RawLine::new(start, text));
    }

    Ok(lines)
}
