//! Label and relation placement onto lines.
//!
//! Labels whose spans resolve cleanly attach to their owning line at local
//! coordinates. Malformed labels attach to line 0 at the sentinel position
//! (kept for `dump`, never drawn). A relation attaches to the later of its
//! two endpoint lines, so it is only drawn once both endpoints exist on
//! screen; relations with an unresolved endpoint are quarantined.

use crate::event::{LogLevel, emit_log};
use crate::label::{Label, Relation};
use crate::line::{Line, PlacedLabel, RawLine};
use crate::locate::locate;
use std::collections::HashMap;

/// The fully assigned line layout for one imported document.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    /// Display lines with attached labels and relations.
    pub lines: Vec<Line>,
    /// Relations with an unresolved endpoint: never drawn, kept for
    /// diagnostics, excluded from `dump`.
    pub quarantined_relations: Vec<Relation>,
    /// Labels that could not be attached anywhere because the document
    /// produced no lines at all. Still included in `dump`.
    pub unplaced_labels: Vec<Label>,
}

/// Attach labels and relations to their owning lines.
///
/// Per-item failures are recovered locally (sentinel placement or
/// quarantine) and reported through the log callback; this function itself
/// never fails.
#[must_use]
pub fn assign(raw_lines: Vec<RawLine>, labels: &[Label], relations: &[Relation]) -> Layout {
    // Resolve every label before moving the raw lines into `Line`s,
    // recording each label's line for relation attachment below.
    let line_lens: Vec<usize> = raw_lines.iter().map(RawLine::len_chars).collect();
    let mut label_line: HashMap<u32, usize> = HashMap::new();
    let mut resolved: Vec<(usize, PlacedLabel)> = Vec::new();
    let mut unplaced_labels = Vec::new();
    for label in labels {
        match locate(label.id, label.pos, &line_lens) {
            Ok(placement) => {
                label_line.insert(label.id, placement.line);
                resolved.push((placement.line, PlacedLabel::at(label.clone(), placement.local)));
            }
            Err(err) => {
                emit_log(LogLevel::Error, &err.to_string());
                if raw_lines.is_empty() {
                    unplaced_labels.push(label.clone());
                } else {
                    resolved.push((0, PlacedLabel::sentinel(label.clone())));
                }
            }
        }
    }

    let mut layout = Layout {
        lines: raw_lines
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Line::from_raw(index, raw))
            .collect(),
        quarantined_relations: Vec::new(),
        unplaced_labels,
    };
    for (line, placed) in resolved {
        layout.lines[line].labels.push(placed);
    }

    for relation in relations {
        let src_line = label_line.get(&relation.src);
        let dst_line = label_line.get(&relation.dst);
        if let (Some(&src), Some(&dst)) = (src_line, dst_line) {
            layout.lines[src.max(dst)].relations.push(relation.clone());
        } else {
            emit_log(
                LogLevel::Warn,
                &format!(
                    "quarantining relation {} -> {}: endpoint label not on any line",
                    relation.src, relation.dst
                ),
            );
            layout.quarantined_relations.push(relation.clone());
        }
    }

    layout
}
