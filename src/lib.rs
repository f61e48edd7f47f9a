//! `annoline` - annotated-text line layout and incremental rendering
//!
//! Renders long-form text as an annotatable document: raw text is split
//! into bounded display lines without ever cutting through an entity label
//! span, label character ranges are remapped to line-local coordinates,
//! relations attach to the later of their endpoint lines, and a
//! cooperative scheduler walks the lines in batches so a long document
//! never blocks the host's event loop.
//!
//! Drawing itself is delegated: the engine emits draw requests through the
//! [`DrawSurface`] trait and can be driven from any host scheduling
//! primitive via [`Annotator::render_step`] or a [`TickScheduler`].
//!
//! # Example
//!
//! ```
//! use annoline::{Annotator, Category, CharSpan, ImmediateTicker, Label, RenderState};
//! # use annoline::{CharExtent, Extent, LabelRegion, TextHandle};
//! # struct NullSurface;
//! # impl annoline::DrawSurface for NullSurface {
//! #     fn draw_text(&mut self, _: usize, _: &str, _: f32, _: f32) -> annoline::Result<TextHandle> {
//! #         Ok(TextHandle(0))
//! #     }
//! #     fn draw_label(&mut self, _: u32, _: u32, _: &LabelRegion) -> annoline::Result<()> { Ok(()) }
//! #     fn draw_relation(&mut self, _: u32, _: u32, _: &str) -> annoline::Result<()> { Ok(()) }
//! #     fn measure(&self, _: TextHandle) -> Extent { Extent::default() }
//! #     fn char_extent(&self, _: TextHandle, _: usize) -> annoline::Result<CharExtent> {
//! #         Ok(CharExtent::default())
//! #     }
//! #     fn is_visible(&self) -> bool { true }
//! # }
//!
//! fn main() -> annoline::Result<()> {
//!     let mut session = Annotator::default();
//!     session.import(
//!         "The patient reported a mild headache. No fever was observed.",
//!         vec![Category::new(1, "sign&symptom")],
//!         vec![Label::new(1, 1, CharSpan::new(28, 35))],
//!         vec![],
//!     )?;
//!
//!     let mut surface = NullSurface;
//!     let state = session.render(&mut surface, &mut ImmediateTicker)?;
//!     assert_eq!(state, RenderState::Finished);
//!     assert_eq!(session.dump().labels.len(), 1);
//!     Ok(())
//! }
//! ```

// Crate-level lint configuration
#![allow(clippy::cast_precision_loss)] // Intentional for progress fractions and extent math
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical

pub mod annotator;
pub mod assign;
pub mod error;
pub mod event;
pub mod label;
pub mod line;
pub mod locate;
pub mod render;
pub mod segment;
pub mod surface;

// Re-export core types at crate root
pub use annotator::{Annotator, AnnotatorOptions, Dump};
pub use assign::Layout;
pub use error::{Error, Result};
pub use event::{LogLevel, emit_log, set_log_callback};
pub use label::{Category, CharSpan, Label, Relation};
pub use line::{Line, LocalSpan, PlacedLabel, RawLine};
pub use locate::Placement;
pub use render::{
    Components, ContentMetrics, ImmediateTicker, RenderState, RenderTask, StepOutcome,
    TickScheduler, TimerTicker,
};
pub use surface::{CharExtent, DrawSurface, Extent, LabelRegion, MonospaceMetrics, TextHandle};
