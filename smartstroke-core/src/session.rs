//! Ink Session: the Tick Driver
//!
//! ## Overview
//!
//! The session wires the pieces into one cooperative loop. The transport
//! pushes frames in; the display loop pulls render frames out:
//!
//! ```text
//! ingest(frame) ──→ TelemetrySlot
//!                        │ snapshot, page turns
//!                        ▼
//! tick(now) ──→ FusionEngine ──→ StrokeRecorder ──→ Notebook
//!     │                                 │
//!     └────────── RenderFrame ◄─────────┘
//! ```
//!
//! `ingest` only writes the slot and `tick` only reads it, so the two sides
//! never observe a half-updated sample. `tick` never blocks; when there is
//! nothing to do it returns `nb::Error::WouldBlock`.
//!
//! Anything that breaks tracking continuity (`stop`, a calibration change, a
//! page turn) seals the stroke in progress first, so stored ink never jumps
//! across the break. A stroke sealed outside a successful tick is reported on
//! the next `RenderFrame`.
//!
//! ## Usage
//!
//! ```rust
//! use smartstroke_core::{FusionConfig, InkSession, TelemetryFrame};
//!
//! let mut session = InkSession::new(FusionConfig::default()).unwrap();
//! assert!(matches!(session.tick(0), Err(nb::Error::WouldBlock)));
//!
//! session.ingest(&TelemetryFrame::new(0).with_pressure(0));
//! // Still uncalibrated
//! assert!(matches!(session.tick(1), Err(nb::Error::Other(_))));
//! ```

use crate::{
    calibration::CalibrationMap,
    engine::{FusionConfig, FusionEngine, FusionOutput},
    errors::{FusionError, FusionResult},
    ink::{CurveSegment, Notebook, Stroke, StrokeColor, StrokePoint, StrokeRecorder},
    telemetry::{RangeSample, TelemetryFrame, TelemetrySlot},
    time::{delta_ms, Timestamp},
};

/// Everything the renderer needs from one tick
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Clock time the tick ran at
    pub timestamp: Timestamp,
    /// Age of the telemetry this frame was computed from
    pub age_ms: u64,
    /// Raw, stable and final positions plus pen state
    pub fusion: FusionOutput,
    /// New piece of the stroke in progress
    pub segment: Option<CurveSegment>,
    /// Stroke sealed since the previous frame
    pub sealed: Option<Stroke>,
    /// Index of the page receiving ink
    pub page: usize,
}

/// Owns the slot, the engine, the recorder and the notebook
#[derive(Debug, Clone)]
pub struct InkSession {
    slot: TelemetrySlot,
    engine: FusionEngine,
    recorder: StrokeRecorder,
    notebook: Notebook,
    unreported: Option<Stroke>,
    running: bool,
}

impl InkSession {
    /// New running session with an uncalibrated engine
    pub fn new(config: FusionConfig) -> FusionResult<Self> {
        Ok(Self {
            slot: TelemetrySlot::new(),
            engine: FusionEngine::new(config)?,
            recorder: StrokeRecorder::new(),
            notebook: Notebook::new(),
            unreported: None,
            running: true,
        })
    }

    /// Hand a decoded frame to the session
    ///
    /// Returns `false` if the frame was older than the current snapshot.
    pub fn ingest(&mut self, frame: &TelemetryFrame) -> bool {
        self.slot.ingest(frame)
    }

    /// Run one display-rate step
    pub fn tick(&mut self, now: Timestamp) -> nb::Result<RenderFrame, FusionError> {
        if !self.running {
            return Err(nb::Error::WouldBlock);
        }
        if self.slot.snapshot().is_none() {
            return Err(nb::Error::WouldBlock);
        }

        // Page turns first, so an open stroke stays on the page it began on
        for _ in 0..self.slot.take_page_turns() {
            self.seal_open_stroke();
            self.notebook.next_page();
        }

        let fusion = match self.slot.snapshot() {
            Some(snapshot) => self.engine.tick(snapshot),
            None => return Err(nb::Error::WouldBlock),
        };
        let fusion = fusion.map_err(|err| {
            log_debug!("Tick held: {}", err);
            nb::Error::Other(err)
        })?;

        let mut segment = None;
        if fusion.pen.down {
            segment = self
                .recorder
                .push(StrokePoint::new(fusion.position, fusion.pen.pressure));
        } else {
            self.seal_open_stroke();
        }

        Ok(RenderFrame {
            timestamp: now,
            age_ms: delta_ms(fusion.pen.timestamp, now),
            fusion,
            segment,
            sealed: self.unreported.take(),
            page: self.notebook.active_index(),
        })
    }

    /// Calibration step 1: the pen rests on anchor 1
    pub fn calibrate_origin(&mut self) -> FusionResult<()> {
        let empty = RangeSample::new();
        let ranges = self.slot.snapshot().map_or(&empty, |s| &s.ranges);
        self.engine.calibrator_mut().fix_origin(ranges)
    }

    /// Calibration step 2: the pen rests on anchor 2
    pub fn calibrate_width(&mut self) -> FusionResult<CalibrationMap> {
        let empty = RangeSample::new();
        let ranges = self.slot.snapshot().map_or(&empty, |s| &s.ranges);
        let map = self.engine.calibrator_mut().fix_width(ranges)?;
        self.seal_open_stroke();
        self.engine.reset_tracking();
        Ok(map)
    }

    /// Discard the calibration and all tracking history
    pub fn reset_calibration(&mut self) {
        self.seal_open_stroke();
        self.engine.calibrator_mut().reset();
        self.engine.reset_tracking();
    }

    /// Treat the pen's current attitude as zero tilt
    pub fn recenter(&mut self) -> FusionResult<()> {
        let orientation = self
            .slot
            .snapshot()
            .and_then(|s| s.orientation)
            .ok_or(FusionError::InvalidOrientation)?;
        self.engine.recenter(&orientation)
    }

    /// Ink color for the current and following strokes
    pub fn set_color(&mut self, color: StrokeColor) {
        self.recorder.set_color(color);
    }

    /// Ink color
    pub fn color(&self) -> StrokeColor {
        self.recorder.color()
    }

    /// Resume ticking; tracking restarts from scratch
    pub fn start(&mut self) {
        if !self.running {
            self.engine.reset_tracking();
            self.running = true;
        }
    }

    /// Pause ticking; `tick` returns `WouldBlock` until `start`
    ///
    /// The stroke in progress is sealed, since the pen may land somewhere
    /// else before ticking resumes.
    pub fn stop(&mut self) {
        self.seal_open_stroke();
        self.running = false;
    }

    /// True unless stopped
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pages and sealed strokes
    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    /// Fusion engine, for inspection
    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    /// Latest telemetry snapshot and pending page turns
    pub fn slot(&self) -> &TelemetrySlot {
        &self.slot
    }

    /// Stroke in progress, if the pen is down
    pub fn recorder(&self) -> &StrokeRecorder {
        &self.recorder
    }

    fn seal_open_stroke(&mut self) {
        if let Some(stroke) = self.recorder.lift() {
            self.notebook.seal(stroke.clone());
            self.unreported = Some(stroke);
        }
    }
}
