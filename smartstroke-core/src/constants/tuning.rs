//! Fusion Tuning Constants
//!
//! This module defines the noise levels and blend factors for the
//! Kalman filters, IMU smoothers and output interpolation.

// ===== KALMAN FILTER =====

/// Measurement noise (R) for the per-axis position filters.
///
/// Expressed in output units squared. UWB ranging on DW1000-class radios
/// jitters by several centimeters; at the typical ~1 px/mm scale this sits
/// around 6.
///
/// Source: Bench tuning on a 1000 px wide writing surface
pub const KALMAN_MEASUREMENT_NOISE: f32 = 6.0;

/// Process noise (Q) when the pen has moved away from the last mark.
///
/// Responsive: the filter must catch up quickly when the user lifts the pen
/// and starts a new word elsewhere on the page.
///
/// Source: Bench tuning, raised slightly for better hover tracking
pub const KALMAN_PROCESS_NOISE_DEFAULT: f32 = 0.005;

/// Process noise (Q) when hovering close to the current filtered point.
///
/// Still stiff: small wobble while hovering near the last stroke (dotting an
/// i, crossing a t) is noise, not intent to move.
///
/// Source: Bench tuning
pub const KALMAN_PROCESS_NOISE_HOVER_NEAR: f32 = 0.0005;

/// Process noise (Q) while the pen is in contact with the surface.
///
/// Ultra-stiff. Once writing, one noisy range sample must not deflect the
/// stroke; the IMU offset supplies the fine motion instead.
///
/// Source: Bench tuning for writing stability
pub const KALMAN_PROCESS_NOISE_LOCKED: f32 = 0.0001;

/// Radius around the filtered point that counts as "hovering near".
///
/// Source: Roughly the width of one handwritten letter
pub const HOVER_RADIUS_MM: f32 = 25.0;

// ===== IMU OFFSET =====

/// Gain applied to the tip displacement derived from pen tilt.
///
/// Wrist motion during handwriting is mostly rotation, and the raw
/// `sin(Δθ)·length` projection under-reports it.
///
/// Source: Bench tuning
pub const IMU_WRITING_GAIN: f32 = 4.0;

/// Exponential smoothing factor for the IMU-derived offset.
///
/// Removes micro-tremor and quantization steps from the IMU before the
/// offset reaches the ink.
///
/// Source: Bench tuning
pub const IMU_SMOOTHING_ALPHA: f32 = 0.4;

// ===== OUTPUT INTERPOLATION =====

/// Interpolation factor toward the fused target while writing.
///
/// Low value gives smooth ink at the cost of a few frames of lag.
pub const LERP_ALPHA_PEN_DOWN: f32 = 0.35;

/// Interpolation factor toward the fused target while hovering.
///
/// High value keeps the hover cursor snappy.
pub const LERP_ALPHA_PEN_UP: f32 = 0.7;

// ===== GEOMETRY =====

/// Determinant threshold below which trilateration is considered singular.
///
/// Anchors closer to collinear than this produce positions dominated by
/// rounding error.
///
/// Source: Empirical, kept exactly as tuned
pub const TRILATERATION_EPSILON: f32 = 1e-6;

/// How far outside [-1, 1] the calibration cosine may stray before the
/// calibration input is rejected as an impossible triangle.
pub const COSINE_CLAMP_TOLERANCE: f32 = 1e-6;

/// Smallest sine of the anchor-1 corner angle accepted by calibration.
///
/// `sin(acos(-1))` is about 1.5e-7 in f32, not 0, so a flat triangle leaves
/// anchor 3 a few microns off the X axis. A relative test catches that where
/// an absolute mm² threshold does not. 1e-3 is about 0.06°.
pub const CALIBRATION_MIN_SINE: f32 = 1e-3;

/// Output span the wider calibrated axis is mapped to.
///
/// Source: Default canvas width of the dashboard
pub const TARGET_OUTPUT_SPAN: f32 = 1000.0;
