//! Cooperative, resumable render scheduling.
//!
//! Rendering walks the line list in fixed-size batches, yielding between
//! batches so a long document never blocks the host's event loop. The
//! resumption token is an explicit [`RenderTask`] holding the next line
//! index; the host drives it through
//! [`Annotator::render_step`](crate::Annotator::render_step) from its own
//! idle/frame primitive, or hands a [`TickScheduler`] to
//! [`Annotator::render`](crate::Annotator::render).
//!
//! Interruption is cooperative: surface visibility is re-checked before
//! every batch, never mid-line, and a vanished surface simply stops the
//! batch pointer from advancing further.

use crate::event::{LogLevel, emit_log};
use crate::line::Line;
use crate::surface::{DrawSurface, Extent, LabelRegion};
use bitflags::bitflags;
use std::time::Duration;

/// Render lifecycle state, monotonic per import cycle:
/// `Init -> Rendering -> {Interrupted | Finished}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderState {
    #[default]
    Init,
    Rendering,
    Interrupted,
    Finished,
}

bitflags! {
    /// Annotation components that can be toggled off without re-importing.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Components: u8 {
        const LABEL = 1;
        const RELATION = 1 << 1;
    }
}

impl Default for Components {
    fn default() -> Self {
        Self::all()
    }
}

/// Result of one scheduling step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// A batch was processed; `progress` is `lines_processed / total_lines`.
    InProgress { progress: f64 },
    /// The batch pointer reached the end of the line list.
    Finished,
    /// The surface went away or a text draw failed.
    Interrupted,
    /// No render cycle is in flight: the task predates the session's
    /// current import and `start` has not been called since.
    NotStarted,
}

/// Running layout metrics accumulated while rendering.
///
/// Each line is drawn at the current content height; its measured extent
/// advances the height and widens the tracked maximum, so a host can size
/// its surface from [`content_extent`](Self::content_extent) at any point.
#[derive(Clone, Copy, Debug)]
pub struct ContentMetrics {
    base_left: f32,
    padding: f32,
    height: f32,
    max_width: f32,
}

const INITIAL_HEIGHT: f32 = 10.0;

impl ContentMetrics {
    pub(crate) fn new(base_left: f32, padding: f32) -> Self {
        Self {
            base_left,
            padding,
            height: INITIAL_HEIGHT,
            max_width: 0.0,
        }
    }

    fn advance(&mut self, line_extent: Extent) {
        let width = line_extent.width + self.base_left;
        if width > self.max_width {
            self.max_width = width;
        }
        self.height += self.padding + line_extent.height;
    }

    /// Total extent of the content drawn so far.
    #[must_use]
    pub fn content_extent(&self) -> Extent {
        Extent {
            width: self.max_width,
            height: self.height,
        }
    }
}

/// Resumption token for an in-flight render cycle.
///
/// Holds only the next line index; all document state stays on the session.
#[derive(Debug)]
pub struct RenderTask {
    next_line: usize,
}

impl RenderTask {
    pub(crate) fn new() -> Self {
        Self { next_line: 0 }
    }

    /// Index of the first line the next batch will draw.
    #[must_use]
    pub fn next_line(&self) -> usize {
        self.next_line
    }

    /// Process one batch of lines.
    ///
    /// Per line: text first, then labels (sentinel and hidden-component
    /// entries skipped), then relations. One bad label or relation never
    /// blocks its siblings or later lines; a failed text draw interrupts
    /// the whole render.
    pub(crate) fn step(
        &mut self,
        lines: &[Line],
        surface: &mut dyn DrawSurface,
        visible: Components,
        metrics: &mut ContentMetrics,
        lines_per_render: usize,
    ) -> StepOutcome {
        if !surface.is_visible() {
            return StepOutcome::Interrupted;
        }
        let total = lines.len();
        if self.next_line >= total {
            return StepOutcome::Finished;
        }
        let end = (self.next_line + lines_per_render.max(1)).min(total);
        for line in &lines[self.next_line..end] {
            let base_top = metrics.content_extent().height;
            let handle = match surface.draw_text(line.index, &line.text, metrics.base_left, base_top)
            {
                Ok(handle) => handle,
                Err(err) => {
                    emit_log(
                        LogLevel::Error,
                        &format!("interrupting render, text draw failed on line {}: {err}", line.index),
                    );
                    return StepOutcome::Interrupted;
                }
            };
            metrics.advance(surface.measure(handle));

            if visible.contains(Components::LABEL) {
                for placed in &line.labels {
                    let Some(local) = placed.local else {
                        continue;
                    };
                    let ends = (
                        surface.char_extent(handle, local.start),
                        surface.char_extent(handle, local.end),
                    );
                    let (start, end) = match ends {
                        (Ok(start), Ok(end)) => (start, end),
                        (Err(err), _) | (_, Err(err)) => {
                            emit_log(
                                LogLevel::Error,
                                &format!("skipping label {}: {err}", placed.label.id),
                            );
                            continue;
                        }
                    };
                    let region = LabelRegion::between(line.index, start, end);
                    if let Err(err) =
                        surface.draw_label(placed.label.id, placed.label.category, &region)
                    {
                        emit_log(
                            LogLevel::Error,
                            &format!("skipping label {}: {err}", placed.label.id),
                        );
                    }
                }
            }

            if visible.contains(Components::RELATION) {
                for relation in &line.relations {
                    if let Err(err) =
                        surface.draw_relation(relation.src, relation.dst, &relation.text)
                    {
                        emit_log(
                            LogLevel::Error,
                            &format!(
                                "skipping relation {} -> {}: {err}",
                                relation.src, relation.dst
                            ),
                        );
                    }
                }
            }
        }
        self.next_line = end;
        let progress = end as f64 / total as f64;
        StepOutcome::InProgress { progress }
    }
}

/// The host's "next available idle/frame" primitive.
///
/// Called between batches; the scheduler never suspends mid-line.
pub trait TickScheduler {
    fn next_tick(&mut self);
}

/// Yields nothing between batches. Suitable for tests and synchronous hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateTicker;

impl TickScheduler for ImmediateTicker {
    fn next_tick(&mut self) {}
}

/// Timer-based fallback for hosts without a frame callback.
#[derive(Clone, Copy, Debug)]
pub struct TimerTicker {
    interval: Duration,
}

impl TimerTicker {
    /// Create a ticker sleeping `interval` between batches.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for TimerTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl TickScheduler for TimerTicker {
    fn next_tick(&mut self) {
        std::thread::sleep(self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{Label, Relation};
    use crate::line::{LocalSpan, PlacedLabel, RawLine};

    use crate::label::CharSpan;

    struct NullSurface {
        visible: bool,
        texts: usize,
        labels: usize,
        relations: usize,
    }

    impl NullSurface {
        fn new() -> Self {
            Self {
                visible: true,
                texts: 0,
                labels: 0,
                relations: 0,
            }
        }
    }

    impl DrawSurface for NullSurface {
        fn draw_text(
            &mut self,
            _line_no: usize,
            _text: &str,
            _x: f32,
            _y: f32,
        ) -> crate::Result<crate::surface::TextHandle> {
            self.texts += 1;
            Ok(crate::surface::TextHandle(self.texts as u64))
        }

        fn draw_label(
            &mut self,
            _id: u32,
            _category: u32,
            _region: &LabelRegion,
        ) -> crate::Result<()> {
            self.labels += 1;
            Ok(())
        }

        fn draw_relation(&mut self, _src: u32, _dst: u32, _text: &str) -> crate::Result<()> {
            self.relations += 1;
            Ok(())
        }

        fn measure(&self, _handle: crate::surface::TextHandle) -> Extent {
            Extent {
                width: 80.0,
                height: 16.0,
            }
        }

        fn char_extent(
            &self,
            _handle: crate::surface::TextHandle,
            offset: usize,
        ) -> crate::Result<crate::surface::CharExtent> {
            Ok(crate::surface::CharExtent {
                x: offset as f32 * 8.0,
                y: 0.0,
                width: 8.0,
                height: 16.0,
            })
        }

        fn is_visible(&self) -> bool {
            self.visible
        }
    }

    fn lines(n: usize) -> Vec<Line> {
        (0..n)
            .map(|i| Line::from_raw(i, RawLine::new(i * 4, "text")))
            .collect()
    }

    #[test]
    fn test_step_batches_and_finishes() {
        let lines = lines(5);
        let mut surface = NullSurface::new();
        let mut task = RenderTask::new();
        let mut metrics = ContentMetrics::new(30.0, 10.0);

        let out = task.step(&lines, &mut surface, Components::all(), &mut metrics, 2);
        assert_eq!(out, StepOutcome::InProgress { progress: 0.4 });
        assert_eq!(task.next_line(), 2);

        task.step(&lines, &mut surface, Components::all(), &mut metrics, 2);
        let out = task.step(&lines, &mut surface, Components::all(), &mut metrics, 2);
        assert_eq!(out, StepOutcome::InProgress { progress: 1.0 });

        let out = task.step(&lines, &mut surface, Components::all(), &mut metrics, 2);
        assert_eq!(out, StepOutcome::Finished);
        assert_eq!(surface.texts, 5);
    }

    #[test]
    fn test_invisible_surface_interrupts_before_batch() {
        let lines = lines(3);
        let mut surface = NullSurface::new();
        surface.visible = false;
        let mut task = RenderTask::new();
        let mut metrics = ContentMetrics::new(30.0, 10.0);

        let out = task.step(&lines, &mut surface, Components::all(), &mut metrics, 2);
        assert_eq!(out, StepOutcome::Interrupted);
        assert_eq!(surface.texts, 0);
        assert_eq!(task.next_line(), 0);
    }

    #[test]
    fn test_hidden_components_are_not_drawn() {
        let mut all = lines(1);
        all[0]
            .labels
            .push(PlacedLabel::at(
                Label::new(1, 1, CharSpan::new(0, 3)),
                LocalSpan::new(0, 3),
            ));
        all[0].relations.push(Relation::new(1, 1, "self"));
        let mut surface = NullSurface::new();
        let mut task = RenderTask::new();
        let mut metrics = ContentMetrics::new(30.0, 10.0);

        task.step(&all, &mut surface, Components::empty(), &mut metrics, 10);
        assert_eq!(surface.texts, 1);
        assert_eq!(surface.labels, 0);
        assert_eq!(surface.relations, 0);
    }

    #[test]
    fn test_sentinel_labels_are_skipped() {
        let mut all = lines(1);
        all[0]
            .labels
            .push(PlacedLabel::sentinel(Label::new(1, 1, CharSpan::new(9, 2))));
        let mut surface = NullSurface::new();
        let mut task = RenderTask::new();
        let mut metrics = ContentMetrics::new(30.0, 10.0);

        task.step(&all, &mut surface, Components::all(), &mut metrics, 10);
        assert_eq!(surface.labels, 0);
    }

    #[test]
    fn test_metrics_accumulate() {
        let lines = lines(3);
        let mut surface = NullSurface::new();
        let mut task = RenderTask::new();
        let mut metrics = ContentMetrics::new(30.0, 10.0);

        task.step(&lines, &mut surface, Components::all(), &mut metrics, 10);
        let extent = metrics.content_extent();
        assert!((extent.width - 110.0).abs() < f32::EPSILON);
        // 10 initial + 3 * (10 padding + 16 line height)
        assert!((extent.height - 88.0).abs() < f32::EPSILON);
    }
}
