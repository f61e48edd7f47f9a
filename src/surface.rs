//! The injected drawing surface.
//!
//! The engine never draws anything itself: it emits draw requests through
//! [`DrawSurface`], and reads glyph geometry back to place label boxes. A
//! host backs this with SVG, canvas, a terminal grid, or (in tests) a
//! recording mock. [`MonospaceMetrics`] provides correct extent math for
//! fixed-cell surfaces without real font metrics.

use crate::error::Result;
use unicode_width::UnicodeWidthChar;

/// Opaque handle to a drawn text line, minted by the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextHandle(pub u64);

/// Measured size of a drawn text line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

/// Geometry of one glyph within a drawn text line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CharExtent {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Region a label box should cover, derived from its endpoint glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelRegion {
    /// 0-based index of the line the label sits on.
    pub line_no: usize,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl LabelRegion {
    /// Build the region spanned by a label's first and last glyph extents.
    #[must_use]
    pub fn between(line_no: usize, start: CharExtent, end: CharExtent) -> Self {
        Self {
            line_no,
            left: start.x,
            top: start.y,
            width: end.x - start.x + end.width,
            height: start.height,
        }
    }
}

/// Drawing surface consumed by the render scheduler.
///
/// Draw order per line is fixed: text, then labels, then relations. A
/// failing `draw_label`/`draw_relation` or `char_extent` call is logged and
/// skipped by the scheduler; a failing `draw_text` interrupts the render.
pub trait DrawSurface {
    /// Draw a line of text at the given position, returning a handle for
    /// later measurement and glyph lookup.
    fn draw_text(&mut self, line_no: usize, text: &str, x: f32, y: f32) -> Result<TextHandle>;

    /// Draw a label box over a region of a drawn line.
    fn draw_label(&mut self, id: u32, category: u32, region: &LabelRegion) -> Result<()>;

    /// Draw a relation connector between two previously drawn labels.
    fn draw_relation(&mut self, src: u32, dst: u32, text: &str) -> Result<()>;

    /// Measure a drawn text line.
    fn measure(&self, handle: TextHandle) -> Extent;

    /// Geometry of the glyph at a line-local char offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GlyphIndex`](crate::Error::GlyphIndex) when no
    /// glyph exists at the offset,
    /// which indicates a label/line mismatch upstream.
    fn char_extent(&self, handle: TextHandle, offset: usize) -> Result<CharExtent>;

    /// Whether the surface is still present and visible.
    ///
    /// Checked before every batch; a `false` answer interrupts the render.
    fn is_visible(&self) -> bool;
}

/// Extent math for monospace surfaces, using Unicode display width.
///
/// Wide characters (CJK, most emoji) occupy two cells; zero-width
/// characters occupy none and report a zero-width extent at the position of
/// the preceding edge.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMetrics {
    pub cell_width: f32,
    pub cell_height: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
        }
    }
}

impl MonospaceMetrics {
    /// Create metrics for the given cell size.
    #[must_use]
    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }

    fn char_cells(c: char) -> usize {
        UnicodeWidthChar::width(c).unwrap_or(0)
    }

    /// Measure a full line of text.
    #[must_use]
    pub fn measure(&self, text: &str) -> Extent {
        let cells: usize = text.chars().map(Self::char_cells).sum();
        Extent {
            width: cells as f32 * self.cell_width,
            height: self.cell_height,
        }
    }

    /// Geometry of the glyph at a char offset, relative to a text origin.
    ///
    /// Returns `None` when the offset has no corresponding glyph.
    #[must_use]
    pub fn char_extent(&self, text: &str, offset: usize, x: f32, y: f32) -> Option<CharExtent> {
        let mut cells_before = 0usize;
        for (i, c) in text.chars().enumerate() {
            let cells = Self::char_cells(c);
            if i == offset {
                return Some(CharExtent {
                    x: x + cells_before as f32 * self.cell_width,
                    y,
                    width: cells as f32 * self.cell_width,
                    height: self.cell_height,
                });
            }
            cells_before += cells;
        }
        None
    }
}
