//! Core fusion engine for SmartStroke
//!
//! Tracks a stylus on an arbitrary flat surface by fusing UWB ranges to three
//! anchors with the pen's IMU orientation, and turns the resulting cursor
//! stream into smoothed ink strokes on pages.
//!
//! Key constraints:
//! - Tracking core runs without heap allocation (ink capture needs `alloc`)
//! - Nothing is fatal: a bad packet holds the last good state
//! - Ticks never block
//!
//! ```no_run
//! use smartstroke_core::{FusionConfig, InkSession, TelemetryFrame, AnchorId};
//!
//! let mut session = InkSession::new(FusionConfig::default()).unwrap();
//!
//! // Pen resting on anchor 1
//! session.ingest(&TelemetryFrame::new(0)
//!     .with_link(AnchorId(0x1685), 0.600)
//!     .with_link(AnchorId(0x1584), 0.400));
//! session.calibrate_origin().unwrap();
//!
//! // Pen resting on anchor 2
//! session.ingest(&TelemetryFrame::new(10).with_link(AnchorId(0x1584), 0.721));
//! let map = session.calibrate_width().unwrap();
//!
//! // Display loop
//! if let Ok(frame) = session.tick(16) {
//!     let cursor = frame.fusion.position;
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(any(feature = "std", feature = "alloc"))]
extern crate alloc;

#[macro_use]
mod macros;

pub mod calibration;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod filters;
pub mod geometry;
pub mod telemetry;
pub mod time;
pub mod traits;

#[cfg(any(feature = "std", feature = "alloc"))]
pub mod ink;
#[cfg(any(feature = "std", feature = "alloc"))]
pub mod session;

// Public API
pub use calibration::{CalibrationConfig, CalibrationMap, CalibrationState, Calibrator};
pub use engine::{FusionConfig, FusionEngine, FusionOutput};
pub use errors::{FusionError, FusionResult};
pub use geometry::{Anchor, AnchorId, Point2, Quaternion, Rect};
pub use telemetry::{LinkReading, PenState, RangeSample, TelemetryFrame, TelemetrySlot, TelemetrySnapshot};

#[cfg(any(feature = "std", feature = "alloc"))]
pub use ink::{CurveSegment, Notebook, Page, Stroke, StrokeColor, StrokePoint, StrokeRecorder};
#[cfg(any(feature = "std", feature = "alloc"))]
pub use session::{InkSession, RenderFrame};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
