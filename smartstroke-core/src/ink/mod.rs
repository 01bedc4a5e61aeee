//! Ink capture: strokes, curve segments, pages
//!
//! While the pen is down, each stabilized position is appended to the stroke
//! in progress and yields one incremental [`CurveSegment`] for the renderer.
//! On lift the stroke is sealed into the active [`Page`] of the
//! [`Notebook`] and never changes again.

pub mod page;
pub mod stroke;

pub use page::{Notebook, Page};
pub use stroke::{CurveSegment, Stroke, StrokeColor, StrokePoint, StrokeRecorder};
