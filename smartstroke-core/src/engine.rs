//! UWB + IMU Fusion Engine
//!
//! ## Overview
//!
//! UWB trilateration gives an absolute position that is noisy at the
//! millimeter scale handwriting needs. The pen's IMU gives crisp, drift-prone
//! relative motion. The engine blends the two once per tick:
//!
//! ```text
//!  ranges ──trilaterate──→ raw ──Kalman x/y (Q by policy)──→ stable ─┐
//!                                                                   (+)──→ target
//!  quaternion ──yaw/pitch──→ Δ vs center ──−sin·lever──→ smoother ──┘        │
//!                                                                            ▼
//!                                  previous ──lerp(α)──→ clamp to bounds → position
//! ```
//!
//! ## Stiffness Policy
//!
//! | Pen    | Raw vs filtered       | Q                 |
//! |--------|-----------------------|-------------------|
//! | down   | any                   | `q_locked`        |
//! | up     | < `hover_radius_mm`   | `q_hover_near`    |
//! | up     | otherwise             | `q_default`       |
//!
//! While writing the UWB fix is nearly frozen and fine motion comes from the
//! IMU. While travelling above the page the filter follows the radio.
//!
//! ## Orientation Center
//!
//! Tilt is measured relative to a center orientation. The center is re-taken
//! on every pen-up tick, so at contact it holds the attitude of the last
//! hover sample and the offset starts from zero.
//!
//! ## Failure Handling
//!
//! Any failure before the filters run (missing range, degenerate solve)
//! returns an error and leaves every piece of state untouched. An unusable
//! orientation only skips the IMU term; the last smoothed offset is reused.

use crate::{
    calibration::{CalibrationConfig, Calibrator},
    constants::{
        hardware::{PEN_LENGTH_MM, PRESSURE_THRESHOLD},
        tuning::{
            HOVER_RADIUS_MM, IMU_SMOOTHING_ALPHA, IMU_WRITING_GAIN, KALMAN_MEASUREMENT_NOISE,
            KALMAN_PROCESS_NOISE_DEFAULT, KALMAN_PROCESS_NOISE_HOVER_NEAR,
            KALMAN_PROCESS_NOISE_LOCKED, LERP_ALPHA_PEN_DOWN, LERP_ALPHA_PEN_UP,
        },
    },
    errors::{FusionError, FusionResult},
    filters::{ExponentialSmoother, ScalarKalmanFilter},
    geometry::{
        orientation::YawPitch, angle_diff, trilateration, yaw_pitch, Point2, Quaternion,
    },
    telemetry::{PenState, TelemetrySnapshot},
    traits::{ScalarFilter, Validatable},
};

/// Fusion tuning
///
/// Every field defaults to the matching value in [`crate::constants`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FusionConfig {
    /// Kalman measurement noise (R)
    pub measurement_noise: f32,
    /// Q while travelling with the pen up
    pub q_default: f32,
    /// Q while hovering near the filtered position
    pub q_hover_near: f32,
    /// Q while the pen is down
    pub q_locked: f32,
    /// Hover radius in world millimeters
    pub hover_radius_mm: f32,
    /// IMU-to-nib lever arm in millimeters
    pub pen_length_mm: f32,
    /// Amplification of the tilt-derived offset
    pub imu_gain: f32,
    /// Exponential smoother alpha for the IMU offsets
    pub smoothing_alpha: f32,
    /// Interpolation toward the target while the pen is down
    pub lerp_pen_down: f32,
    /// Interpolation toward the target while the pen is up
    pub lerp_pen_up: f32,
    /// Pressure above which the pen is down
    pub pressure_threshold: u16,
    /// Calibration settings, including the anchor addresses
    pub calibration: CalibrationConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            measurement_noise: KALMAN_MEASUREMENT_NOISE,
            q_default: KALMAN_PROCESS_NOISE_DEFAULT,
            q_hover_near: KALMAN_PROCESS_NOISE_HOVER_NEAR,
            q_locked: KALMAN_PROCESS_NOISE_LOCKED,
            hover_radius_mm: HOVER_RADIUS_MM,
            pen_length_mm: PEN_LENGTH_MM,
            imu_gain: IMU_WRITING_GAIN,
            smoothing_alpha: IMU_SMOOTHING_ALPHA,
            lerp_pen_down: LERP_ALPHA_PEN_DOWN,
            lerp_pen_up: LERP_ALPHA_PEN_UP,
            pressure_threshold: PRESSURE_THRESHOLD,
            calibration: CalibrationConfig::default(),
        }
    }
}

impl FusionConfig {
    /// Set the Kalman measurement noise
    pub fn with_measurement_noise(mut self, r: f32) -> Self {
        self.measurement_noise = r;
        self
    }

    /// Set the three process-noise levels: default, hover-near, locked
    pub fn with_process_noise(mut self, default: f32, hover_near: f32, locked: f32) -> Self {
        self.q_default = default;
        self.q_hover_near = hover_near;
        self.q_locked = locked;
        self
    }

    /// Radius, in mm, inside which a hovering pen counts as near
    pub fn with_hover_radius_mm(mut self, radius: f32) -> Self {
        self.hover_radius_mm = radius;
        self
    }

    /// Set the lever arm and gain used for tilt compensation
    pub fn with_imu(mut self, pen_length_mm: f32, gain: f32) -> Self {
        self.pen_length_mm = pen_length_mm;
        self.imu_gain = gain;
        self
    }

    /// Smoothing factor for the IMU offset, in (0, 1]
    pub fn with_smoothing_alpha(mut self, alpha: f32) -> Self {
        self.smoothing_alpha = alpha;
        self
    }

    /// Set the interpolation factors for pen down and pen up
    pub fn with_lerp(mut self, pen_down: f32, pen_up: f32) -> Self {
        self.lerp_pen_down = pen_down;
        self.lerp_pen_up = pen_up;
        self
    }

    /// Raw pressure above which the pen counts as down
    pub fn with_pressure_threshold(mut self, threshold: u16) -> Self {
        self.pressure_threshold = threshold;
        self
    }

    /// Anchor ids and output span used by calibration
    pub fn with_calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = calibration;
        self
    }

    /// Check every value is inside its legal range
    pub fn validate(&self) -> FusionResult<()> {
        fn positive(value: f32, name: &'static str) -> FusionResult<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(FusionError::InvalidParameter { name })
            }
        }

        fn unit_interval(value: f32, name: &'static str) -> FusionResult<()> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(FusionError::InvalidParameter { name })
            }
        }

        positive(self.measurement_noise, "measurement_noise")?;
        positive(self.q_default, "q_default")?;
        positive(self.q_hover_near, "q_hover_near")?;
        positive(self.q_locked, "q_locked")?;
        positive(self.hover_radius_mm, "hover_radius_mm")?;
        positive(self.pen_length_mm, "pen_length_mm")?;
        if !self.imu_gain.is_finite() {
            return Err(FusionError::InvalidParameter { name: "imu_gain" });
        }
        unit_interval(self.smoothing_alpha, "smoothing_alpha")?;
        unit_interval(self.lerp_pen_down, "lerp_pen_down")?;
        unit_interval(self.lerp_pen_up, "lerp_pen_up")?;
        positive(self.calibration.target_span, "target_span")
    }
}

/// Result of one successful fusion tick, in output units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionOutput {
    /// Trilaterated position before filtering
    pub raw: Point2,
    /// Kalman-filtered UWB position
    pub stable: Point2,
    /// Smoothed IMU offset added to `stable`
    pub offset: Point2,
    /// Final interpolated and clamped position
    pub position: Point2,
    /// Pen contact and attitude
    pub pen: PenState,
}

/// Owns the calibrator and all per-axis tracking state
#[derive(Debug, Clone)]
pub struct FusionEngine {
    config: FusionConfig,
    calibrator: Calibrator,
    kalman_x: ScalarKalmanFilter,
    kalman_y: ScalarKalmanFilter,
    yaw_smoother: ExponentialSmoother,
    pitch_smoother: ExponentialSmoother,
    center: Option<YawPitch>,
    offset: Point2,
    position: Option<Point2>,
}

impl FusionEngine {
    /// Create an uncalibrated engine
    pub fn new(config: FusionConfig) -> FusionResult<Self> {
        config.validate()?;

        let smoother = ExponentialSmoother::new(config.smoothing_alpha)?;
        let kalman = ScalarKalmanFilter::new(config.measurement_noise, config.q_default);

        Ok(Self {
            calibrator: Calibrator::new(config.calibration.clone()),
            kalman_x: kalman.clone(),
            kalman_y: kalman,
            yaw_smoother: smoother.clone(),
            pitch_smoother: smoother,
            center: None,
            offset: Point2::ORIGIN,
            position: None,
            config,
        })
    }

    /// Tuning this engine was built with
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Calibration state and, once complete, the map
    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    /// Mutable access for the calibration steps
    ///
    /// Call [`reset_tracking`](Self::reset_tracking) after the map changes;
    /// filter history in the old output units is meaningless under a new one.
    pub fn calibrator_mut(&mut self) -> &mut Calibrator {
        &mut self.calibrator
    }

    /// Last stabilized position, `None` before the first successful tick
    pub fn position(&self) -> Option<Point2> {
        self.position
    }

    /// Process noise applied on the most recent tick
    pub fn process_noise(&self) -> f32 {
        self.kalman_x.q
    }

    /// Run one fusion step against `snapshot`
    pub fn tick(&mut self, snapshot: &TelemetrySnapshot) -> FusionResult<FusionOutput> {
        let map = *self.calibrator.map().ok_or(FusionError::CalibrationIncomplete)?;
        let pen = snapshot.pen_state(self.config.pressure_threshold);

        // 1. Absolute position
        let anchors = map.anchors();
        let distances = [
            snapshot.ranges.require(anchors[0].id)?,
            snapshot.ranges.require(anchors[1].id)?,
            snapshot.ranges.require(anchors[2].id)?,
        ];
        let raw = map.to_output(trilateration::solve(distances, anchors)?);
        if !raw.is_valid() {
            return Err(FusionError::DegenerateGeometry { reason: "non-finite solution" });
        }

        // 2. Stiffness policy, then per-axis Kalman
        let drift = match (self.kalman_x.value(), self.kalman_y.value()) {
            (Some(x), Some(y)) => raw.distance_to(Point2::new(x, y)),
            _ => 0.0,
        };
        let q = if pen.down {
            self.config.q_locked
        } else if drift < self.config.hover_radius_mm * map.units_per_mm() {
            self.config.q_hover_near
        } else {
            self.config.q_default
        };
        self.kalman_x.q = q;
        self.kalman_y.q = q;
        let stable = Point2::new(self.kalman_x.filter(raw.x), self.kalman_y.filter(raw.y));

        // 3-4. Tilt compensation
        let offset = match pen.orientation.map(|q| q.normalized()) {
            Some(Ok(orientation)) => self.tilt_offset(&orientation, pen.down, map.units_per_mm()),
            _ => {
                log_debug!("Orientation unusable, reusing last IMU offset");
                self.offset
            }
        };

        // 5-7. Blend, interpolate, clamp
        let target = stable.offset_by(offset.x, offset.y);
        let alpha = if pen.down {
            self.config.lerp_pen_down
        } else {
            self.config.lerp_pen_up
        };
        let next = match self.position {
            Some(previous) => previous.lerp(target, alpha),
            None => target,
        };
        let position = map.output_bounds().clamp(next);
        self.position = Some(position);

        Ok(FusionOutput {
            raw,
            stable,
            offset,
            position,
            pen,
        })
    }

    fn tilt_offset(&mut self, orientation: &Quaternion, pen_down: bool, units_per_mm: f32) -> Point2 {
        let angles = yaw_pitch(orientation);

        let center = match self.center {
            Some(center) if pen_down => center,
            _ => {
                self.center = Some(angles);
                self.yaw_smoother.reset();
                self.pitch_smoother.reset();
                angles
            }
        };

        let lever = self.config.pen_length_mm * self.config.imu_gain * units_per_mm;
        let dx = -libm::sinf(angle_diff(angles.yaw, center.yaw)) * lever;
        let dy = -libm::sinf(angle_diff(angles.pitch, center.pitch)) * lever;

        self.offset = Point2::new(self.yaw_smoother.filter(dx), self.pitch_smoother.filter(dy));
        self.offset
    }

    /// Take `orientation` as the new zero-tilt attitude
    pub fn recenter(&mut self, orientation: &Quaternion) -> FusionResult<()> {
        let orientation = orientation.normalized()?;
        self.center = Some(yaw_pitch(&orientation));
        self.yaw_smoother.reset();
        self.pitch_smoother.reset();
        self.offset = Point2::ORIGIN;
        Ok(())
    }

    /// Forget all tracking history; calibration is kept
    pub fn reset_tracking(&mut self) {
        self.kalman_x.reset();
        self.kalman_y.reset();
        self.yaw_smoother.reset();
        self.pitch_smoother.reset();
        self.center = None;
        self.offset = Point2::ORIGIN;
        self.position = None;
    }
}
