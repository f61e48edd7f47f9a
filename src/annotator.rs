//! The annotation session: one imported document, its line layout, and the
//! render lifecycle around it.

use crate::assign::{Layout, assign};
use crate::error::{Error, Result};
use crate::label::{Category, CharSpan, Label, Relation, ensure_sorted_by_start};
use crate::line::{Line, PlacedLabel};
use crate::locate::locate;
use crate::render::{
    Components, ContentMetrics, RenderState, RenderTask, StepOutcome, TickScheduler,
};
use crate::segment::segment;
use crate::surface::{DrawSurface, Extent};
use ropey::Rope;
use serde::{Deserialize, Serialize};

/// Session configuration.
#[derive(Clone, Copy, Debug)]
pub struct AnnotatorOptions {
    /// Maximum characters per display line before a forced cut.
    pub max_slice_len: usize,
    /// Lines drawn per scheduling batch.
    pub lines_per_render: usize,
    /// Vertical padding between lines, in surface units.
    pub padding: f32,
    /// Left margin where line text starts, in surface units.
    pub base_left: f32,
    /// Components drawn initially.
    pub visible: Components,
}

impl Default for AnnotatorOptions {
    fn default() -> Self {
        Self {
            max_slice_len: 80,
            lines_per_render: 15,
            padding: 10.0,
            base_left: 30.0,
            visible: Components::all(),
        }
    }
}

/// Serialized label/relation placements, the round-trip partner to
/// [`Annotator::import`]. Independent of line layout: labels keep their
/// original global `pos`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dump {
    pub labels: Vec<Label>,
    pub relations: Vec<Relation>,
}

type ProgressHandler = Box<dyn FnMut(f64) + Send>;

/// An annotation session over one imported document.
///
/// Owns the raw text, the segmented line layout, the category legend and
/// the render state machine. A new [`import`](Self::import) replaces
/// everything wholesale; nothing is mutated in place across imports.
pub struct Annotator {
    options: AnnotatorOptions,
    raw: Rope,
    categories: Vec<Category>,
    layout: Layout,
    visible: Components,
    state: RenderState,
    progress: f64,
    metrics: ContentMetrics,
    on_progress: Option<ProgressHandler>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotatorOptions::default())
    }
}

impl Annotator {
    /// Create an empty session.
    #[must_use]
    pub fn new(options: AnnotatorOptions) -> Self {
        Self {
            options,
            raw: Rope::new(),
            categories: Vec::new(),
            layout: Layout::default(),
            visible: options.visible,
            state: RenderState::Init,
            progress: 0.0,
            metrics: ContentMetrics::new(options.base_left, options.padding),
            on_progress: None,
        }
    }

    /// Import a document with its annotations, replacing any previous one.
    ///
    /// Labels must be sorted by span start. Segmentation, offset mapping and
    /// assignment all run here; afterwards the session is in `Init` with
    /// lines ready to render. The reset is transactional: on any error the
    /// previous document and state are left untouched.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentImport`] while a render cycle is in flight,
    /// [`Error::UnsortedLabels`] when the sort contract is violated, and
    /// [`Error::SegmentationDeadlock`] on structurally inconsistent input.
    pub fn import(
        &mut self,
        raw: &str,
        categories: Vec<Category>,
        labels: Vec<Label>,
        relations: Vec<Relation>,
    ) -> Result<()> {
        if self.state == RenderState::Rendering {
            return Err(Error::ConcurrentImport);
        }
        ensure_sorted_by_start(&labels)?;
        let rope = Rope::from_str(raw);
        let raw_lines = segment(&rope, &labels, self.options.max_slice_len)?;
        let layout = assign(raw_lines, &labels, &relations);

        self.raw = rope;
        self.categories = categories;
        self.layout = layout;
        self.state = RenderState::Init;
        self.progress = 0.0;
        self.metrics = ContentMetrics::new(self.options.base_left, self.options.padding);
        Ok(())
    }

    /// Begin a render cycle, returning its resumption token.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidStart`] unless the session is in `Init`.
    pub fn start(&mut self) -> Result<RenderTask> {
        if self.state != RenderState::Init {
            return Err(Error::InvalidStart { state: self.state });
        }
        self.state = RenderState::Rendering;
        Ok(RenderTask::new())
    }

    /// Process one batch of lines, advancing the task.
    ///
    /// Emits a progress event after the batch. The step that finds the
    /// pointer already at the end reports `Finished` without drawing or
    /// emitting. Once the session has left `Rendering`, further calls
    /// report the terminal outcome without touching the surface; a stale
    /// task driven after a fresh import, before `start`, reports
    /// `NotStarted`.
    pub fn render_step(
        &mut self,
        task: &mut RenderTask,
        surface: &mut dyn DrawSurface,
    ) -> StepOutcome {
        match self.state {
            RenderState::Rendering => {}
            RenderState::Init => return StepOutcome::NotStarted,
            RenderState::Finished => return StepOutcome::Finished,
            RenderState::Interrupted => return StepOutcome::Interrupted,
        }
        let outcome = task.step(
            &self.layout.lines,
            surface,
            self.visible,
            &mut self.metrics,
            self.options.lines_per_render,
        );
        match outcome {
            StepOutcome::InProgress { progress } => {
                self.progress = progress;
                if let Some(handler) = self.on_progress.as_mut() {
                    handler(progress);
                }
            }
            StepOutcome::Finished => self.state = RenderState::Finished,
            StepOutcome::Interrupted => self.state = RenderState::Interrupted,
            // The task itself never reports NotStarted; that is decided
            // from the session state above.
            StepOutcome::NotStarted => {}
        }
        outcome
    }

    /// Render the whole document, yielding through `ticker` between batches.
    ///
    /// Returns the terminal state (`Finished`, or `Interrupted` when the
    /// surface went away mid-render).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidStart`] unless the session is in `Init`.
    pub fn render(
        &mut self,
        surface: &mut dyn DrawSurface,
        ticker: &mut dyn TickScheduler,
    ) -> Result<RenderState> {
        let mut task = self.start()?;
        loop {
            match self.render_step(&mut task, surface) {
                StepOutcome::InProgress { .. } => ticker.next_tick(),
                StepOutcome::Finished => return Ok(RenderState::Finished),
                StepOutcome::Interrupted => return Ok(RenderState::Interrupted),
                StepOutcome::NotStarted => {
                    return Err(Error::InvalidStart { state: self.state });
                }
            }
        }
    }

    /// Cooperatively stop an in-flight render.
    ///
    /// Takes effect immediately for subsequent steps; already-drawn
    /// elements are not rolled back. A fresh [`import`](Self::import) is
    /// required to render again.
    pub fn interrupt(&mut self) {
        if self.state == RenderState::Rendering {
            self.state = RenderState::Interrupted;
        }
    }

    /// Serialize current label/relation placements.
    ///
    /// Labels come back with their original id, category and global span,
    /// malformed ones included; quarantined relations are excluded.
    #[must_use]
    pub fn dump(&self) -> Dump {
        let mut labels: Vec<Label> = self
            .layout
            .lines
            .iter()
            .flat_map(|line| line.labels.iter().map(|placed| placed.label.clone()))
            .collect();
        labels.extend(self.layout.unplaced_labels.iter().cloned());
        let relations = self
            .layout
            .lines
            .iter()
            .flat_map(|line| line.relations.iter().cloned())
            .collect();
        Dump { labels, relations }
    }

    /// Create a label from a selection span, assigning the next free id.
    ///
    /// Lines are already fixed, so the span is mapped with the same rules
    /// as imported labels and rejected when the mapping is inconsistent.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRangeLabel`] when the span does not map to coherent
    /// line-local coordinates.
    pub fn add_label(&mut self, category: u32, pos: CharSpan) -> Result<u32> {
        let id = self
            .layout
            .lines
            .iter()
            .flat_map(|line| line.labels.iter().map(|placed| placed.label.id))
            .chain(self.layout.unplaced_labels.iter().map(|label| label.id))
            .max()
            .map_or(0, |max| max + 1);
        let line_lens: Vec<usize> = self.layout.lines.iter().map(Line::len_chars).collect();
        let placement = locate(id, pos, &line_lens)?;
        let label = Label::new(id, category, pos);
        self.layout.lines[placement.line]
            .labels
            .push(PlacedLabel::at(label, placement.local));
        Ok(id)
    }

    /// Toggle drawing of a component class for future batches.
    pub fn set_visible(&mut self, components: Components, visible: bool) {
        self.visible.set(components, visible);
    }

    /// Components currently drawn.
    #[must_use]
    pub fn visible(&self) -> Components {
        self.visible
    }

    /// Register the progress event handler, replacing any previous one.
    ///
    /// Called after every rendered batch with the fraction of lines
    /// processed: strictly increasing values in `(0, 1]`.
    pub fn set_progress_handler<F>(&mut self, handler: F)
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.on_progress = Some(Box::new(handler));
    }

    /// Current render state.
    #[must_use]
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Fraction of lines rendered so far, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// The segmented lines with their attached labels and relations.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.layout.lines
    }

    /// Number of display lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.layout.lines.len()
    }

    /// Relations excluded from rendering because an endpoint never
    /// resolved to a line. Kept for diagnostics.
    #[must_use]
    pub fn quarantined_relations(&self) -> &[Relation] {
        &self.layout.quarantined_relations
    }

    /// The category legend, as imported.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by its code.
    #[must_use]
    pub fn category(&self, id: u32) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// The imported raw text.
    #[must_use]
    pub fn raw_text(&self) -> String {
        self.raw.to_string()
    }

    /// Extent of the content drawn so far, for sizing the host surface.
    #[must_use]
    pub fn content_extent(&self) -> Extent {
        self.metrics.content_extent()
    }
}
