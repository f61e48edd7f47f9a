//! Recording mock surface shared by integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use annoline::{
    CharExtent, DrawSurface, Error, Extent, LabelRegion, MonospaceMetrics, Result, TextHandle,
};
use std::cell::Cell;
use std::collections::HashSet;

/// One recorded draw call, in issue order.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Text { line_no: usize, text: String },
    Label { id: u32, region: LabelRegion },
    Relation { src: u32, dst: u32 },
}

/// A monospace surface that records every draw call.
pub struct MockSurface {
    metrics: MonospaceMetrics,
    /// Drawn text lines, indexed by handle.
    drawn: Vec<(usize, String, f32, f32)>,
    /// All draw calls in order.
    pub ops: Vec<Op>,
    /// Label ids whose `draw_label` fails.
    pub fail_labels: HashSet<u32>,
    /// Line indexes whose `draw_text` fails.
    pub fail_lines: HashSet<usize>,
    /// `(src, dst)` pairs whose `draw_relation` fails.
    pub fail_relations: HashSet<(u32, u32)>,
    /// Number of visibility checks that pass before the surface reports
    /// itself gone. `None` means always visible.
    pub hide_after: Option<usize>,
    visibility_checks: Cell<usize>,
}

impl Default for MockSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSurface {
    pub fn new() -> Self {
        Self {
            metrics: MonospaceMetrics::new(8.0, 16.0),
            drawn: Vec::new(),
            ops: Vec::new(),
            fail_labels: HashSet::new(),
            fail_lines: HashSet::new(),
            fail_relations: HashSet::new(),
            hide_after: None,
            visibility_checks: Cell::new(0),
        }
    }

    pub fn text_count(&self) -> usize {
        self.drawn.len()
    }

    pub fn drawn_label_ids(&self) -> Vec<u32> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Label { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn drawn_relations(&self) -> Vec<(u32, u32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Relation { src, dst } => Some((*src, *dst)),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for MockSurface {
    fn draw_text(&mut self, line_no: usize, text: &str, x: f32, y: f32) -> Result<TextHandle> {
        if self.fail_lines.contains(&line_no) {
            return Err(Error::Surface(format!("text on line {line_no} rejected")));
        }
        let handle = TextHandle(self.drawn.len() as u64);
        self.drawn.push((line_no, text.to_string(), x, y));
        self.ops.push(Op::Text {
            line_no,
            text: text.to_string(),
        });
        Ok(handle)
    }

    fn draw_label(&mut self, id: u32, _category: u32, region: &LabelRegion) -> Result<()> {
        if self.fail_labels.contains(&id) {
            return Err(Error::Surface(format!("label {id} rejected")));
        }
        self.ops.push(Op::Label {
            id,
            region: *region,
        });
        Ok(())
    }

    fn draw_relation(&mut self, src: u32, dst: u32, _text: &str) -> Result<()> {
        if self.fail_relations.contains(&(src, dst)) {
            return Err(Error::Surface(format!("relation {src} -> {dst} rejected")));
        }
        self.ops.push(Op::Relation { src, dst });
        Ok(())
    }

    fn measure(&self, handle: TextHandle) -> Extent {
        let (_, text, _, _) = &self.drawn[handle.0 as usize];
        self.metrics.measure(text)
    }

    fn char_extent(&self, handle: TextHandle, offset: usize) -> Result<CharExtent> {
        let (line_no, text, x, y) = &self.drawn[handle.0 as usize];
        self.metrics
            .char_extent(text, offset, *x, *y)
            .ok_or(Error::GlyphIndex {
                line: *line_no,
                offset,
            })
    }

    fn is_visible(&self) -> bool {
        let checks = self.visibility_checks.get() + 1;
        self.visibility_checks.set(checks);
        self.hide_after.is_none_or(|n| checks <= n)
    }
}
