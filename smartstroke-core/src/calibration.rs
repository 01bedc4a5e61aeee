//! Two-Tap Surface Calibration
//!
//! ## Overview
//!
//! The anchors are placed by hand around the writing surface, so their
//! coordinates are unknown. Calibration derives them from ranges alone, using
//! the pen itself as a survey instrument:
//!
//! ```text
//!   A3 ●                         1. Touch A1:  record d(1,2), d(1,3)
//!      │ ╲                       2. Touch A2:  record d(2,3)
//!  d13 │   ╲ d23
//!      │ A   ╲                   A1 = (0, 0)
//!   A1 ●───────● A2              A2 = (d12, 0)
//!        d12                     A3 = (d13·cos A, d13·sin A)
//! ```
//!
//! `cos A` comes from the law of cosines:
//!
//! ```text
//! cos A = (d13² + d12² − d23²) / (2·d13·d12)
//! ```
//!
//! Range noise can push that quotient slightly outside `[−1, 1]`, where
//! `acos` is undefined, so it is clamped first. A clamp that engages by more
//! than `COSINE_CLAMP_TOLERANCE` means the three ranges cannot form a
//! triangle; step 2 is rejected and may be retaken. A triangle whose corner
//! at anchor 1 has `sin A` below `CALIBRATION_MIN_SINE` is rejected as
//! collinear for the same reason.
//!
//! ## State Machine
//!
//! ```text
//! Uninitialized ──fix_origin──→ OriginFixed ──fix_width──→ Complete
//!       ↑                                                     │
//!       └───────────────────────── reset ─────────────────────┘
//! ```
//!
//! A completed map never changes until `reset`.
//!
//! ## Output Scale
//!
//! The wider of the two calibrated axes is mapped to `target_span` output
//! units. Both axes share the scale, so ink keeps its aspect ratio.

use crate::{
    constants::{
        hardware::{ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID},
        tuning::{
            CALIBRATION_MIN_SINE, COSINE_CLAMP_TOLERANCE, TARGET_OUTPUT_SPAN,
            TRILATERATION_EPSILON,
        },
    },
    errors::{FusionError, FusionResult},
    geometry::{Anchor, AnchorId, Point2, Rect},
    telemetry::RangeSample,
};

/// Calibration tuning
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationConfig {
    /// Anchor addresses in role order: origin, X axis, third
    pub anchor_ids: [AnchorId; 3],
    /// Output units the wider calibrated axis maps to
    pub target_span: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            anchor_ids: [ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID],
            target_span: TARGET_OUTPUT_SPAN,
        }
    }
}

impl CalibrationConfig {
    /// Set the output span for the wider axis
    pub fn with_target_span(mut self, span: f32) -> Self {
        self.target_span = span;
        self
    }

    /// Use different anchor addresses
    pub fn with_anchor_ids(mut self, ids: [AnchorId; 3]) -> Self {
        self.anchor_ids = ids;
        self
    }
}

/// Resolved anchor layout and output scale
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationMap {
    anchors: [Anchor; 3],
    units_per_mm: f32,
    world_bounds: Rect,
}

impl CalibrationMap {
    /// Anchors in role order with world coordinates (mm)
    pub fn anchors(&self) -> &[Anchor; 3] {
        &self.anchors
    }

    /// Output units per millimeter
    pub fn units_per_mm(&self) -> f32 {
        self.units_per_mm
    }

    /// Writable rectangle in world units (mm)
    pub fn world_bounds(&self) -> Rect {
        self.world_bounds
    }

    /// Writable rectangle in output units
    pub fn output_bounds(&self) -> Rect {
        self.world_bounds.scaled(self.units_per_mm)
    }

    /// Convert a world point (mm) to output units
    pub fn to_output(&self, world: Point2) -> Point2 {
        world.scaled(self.units_per_mm)
    }

    /// Convert an output-unit length to millimeters
    pub fn to_mm(&self, length: f32) -> f32 {
        length / self.units_per_mm
    }
}

/// Where the calibration procedure currently stands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationState {
    /// Nothing recorded yet
    Uninitialized,
    /// Ranges from anchor 1's location are recorded
    OriginFixed {
        /// Distance anchor 1 → anchor 2 (mm)
        d12: f32,
        /// Distance anchor 1 → anchor 3 (mm)
        d13: f32,
    },
    /// Anchor map resolved; immutable until reset
    Complete(CalibrationMap),
}

/// Drives the two calibration taps
#[derive(Debug, Clone)]
pub struct Calibrator {
    config: CalibrationConfig,
    state: CalibrationState,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl Calibrator {
    /// Uncalibrated calibrator
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            state: CalibrationState::Uninitialized,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Where the procedure stands
    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    /// Resolved map, once calibration is complete
    pub fn map(&self) -> Option<&CalibrationMap> {
        match &self.state {
            CalibrationState::Complete(map) => Some(map),
            _ => None,
        }
    }

    /// True once the map is resolved
    pub fn is_complete(&self) -> bool {
        matches!(self.state, CalibrationState::Complete(_))
    }

    /// Step 1: the pen rests on anchor 1
    ///
    /// Records the ranges to anchors 2 and 3. May be repeated to retake the
    /// origin before step 2.
    pub fn fix_origin(&mut self, ranges: &RangeSample) -> FusionResult<()> {
        if self.is_complete() {
            return Err(FusionError::CalibrationLocked);
        }

        let [_, id2, id3] = self.config.anchor_ids;
        let d12 = ranges.require(id2)?;
        let d13 = ranges.require(id3)?;

        if !(d12 > 0.0) || !(d13 > 0.0) {
            return Err(FusionError::DegenerateGeometry { reason: "zero-length baseline" });
        }

        log_info!("Calibration origin fixed: d12={}mm d13={}mm", d12, d13);
        self.state = CalibrationState::OriginFixed { d12, d13 };
        Ok(())
    }

    /// Step 2: the pen rests on anchor 2
    ///
    /// Records the range to anchor 3 and resolves the full map.
    pub fn fix_width(&mut self, ranges: &RangeSample) -> FusionResult<CalibrationMap> {
        let (d12, d13) = match self.state {
            CalibrationState::Uninitialized => return Err(FusionError::CalibrationIncomplete),
            CalibrationState::Complete(_) => return Err(FusionError::CalibrationLocked),
            CalibrationState::OriginFixed { d12, d13 } => (d12, d13),
        };

        let d23 = ranges.require(self.config.anchor_ids[2])?;
        let map = resolve_map(d12, d13, d23, &self.config)?;

        log_info!(
            "Calibration complete: A2=({}, 0) A3=({}, {}) scale={} units/mm",
            map.anchors[1].position.x,
            map.anchors[2].position.x,
            map.anchors[2].position.y,
            map.units_per_mm
        );
        self.state = CalibrationState::Complete(map);
        Ok(map)
    }

    /// Discard everything and return to `Uninitialized`
    pub fn reset(&mut self) {
        log_info!("Calibration reset");
        self.state = CalibrationState::Uninitialized;
    }
}

/// Place the three anchors from their pairwise distances (mm)
pub fn resolve_map(
    d12: f32,
    d13: f32,
    d23: f32,
    config: &CalibrationConfig,
) -> FusionResult<CalibrationMap> {
    if !(d12 > 0.0) || !(d13 > 0.0) || !d23.is_finite() {
        return Err(FusionError::DegenerateGeometry { reason: "zero-length baseline" });
    }
    if !(config.target_span > 0.0) || !config.target_span.is_finite() {
        return Err(FusionError::InvalidParameter { name: "target_span" });
    }

    let raw_cos = (d13 * d13 + d12 * d12 - d23 * d23) / (2.0 * d13 * d12);
    let cos_a = raw_cos.max(-1.0).min(1.0);

    if libm::fabsf(raw_cos - cos_a) > COSINE_CLAMP_TOLERANCE {
        log_warn!("Calibration ranges violate triangle inequality (cos A = {})", raw_cos);
        return Err(FusionError::DegenerateGeometry {
            reason: "calibration ranges violate triangle inequality",
        });
    }

    let sin_a = libm::sinf(libm::acosf(cos_a));
    let [id1, id2, id3] = config.anchor_ids;
    let a2 = Point2::new(d12, 0.0);
    let a3 = Point2::new(d13 * cos_a, d13 * sin_a);

    // Same determinant the trilateration solve divides by
    if !(sin_a >= CALIBRATION_MIN_SINE) || 4.0 * a3.y * a2.x < TRILATERATION_EPSILON {
        return Err(FusionError::DegenerateGeometry { reason: "anchors are collinear" });
    }

    let width = a2.x;
    let height = libm::fabsf(a3.y);
    let units_per_mm = config.target_span / width.max(height);

    Ok(CalibrationMap {
        anchors: [
            Anchor::new(id1, Point2::ORIGIN),
            Anchor::new(id2, a2),
            Anchor::new(id3, a3),
        ],
        units_per_mm,
        world_bounds: Rect::from_size(width, height),
    })
}
