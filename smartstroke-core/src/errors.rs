//! Error Types for the Fusion Pipeline
//!
//! ## Design Philosophy
//!
//! Nothing in the tracking core is fatal. A single garbled packet must never
//! produce a visible glitch or a discontinuity in stored ink, so every error
//! here describes a reason to *hold the last good state*, not a reason to stop.
//!
//! Errors are kept small and `Copy`:
//!
//! 1. **No Heap Allocation**: messages are `&'static str`, ids are inline.
//! 2. **Cheap to Return**: the fusion tick returns one of these on every held
//!    frame, which can be dozens of times per second with a flaky radio link.
//! 3. **Actionable**: each variant tells the caller which input was bad.
//!
//! ## Error Categories
//!
//! ### Measurement Problems (recovered per tick)
//! - `MissingMeasurement`: an anchor range was absent this tick
//! - `InvalidOrientation`: the quaternion was NaN, infinite or zero-length
//!
//! ### Geometry Problems
//! - `DegenerateGeometry`: collinear anchors, a collapsed calibration
//!   triangle, or a solve that produced a non-finite point
//!
//! ### Lifecycle Problems
//! - `CalibrationIncomplete`: fusion or the second calibration step was
//!   attempted too early
//! - `CalibrationLocked`: a calibration step was attempted on a completed map
//! - `InvalidParameter`: a filter or config value outside its legal range
//!
//! ## Handling Strategy
//!
//! ```rust
//! use smartstroke_core::FusionError;
//!
//! fn on_held_tick(err: FusionError) {
//!     match err {
//!         FusionError::MissingMeasurement { .. } => {
//!             // Radio dropout - keep drawing the last cursor
//!         }
//!         FusionError::CalibrationIncomplete => {
//!             // Prompt the user to run the two calibration taps
//!         }
//!         _ => {
//!             // Everything else is transient noise
//!         }
//!     }
//! }
//! ```

use thiserror_no_std::Error;

use crate::geometry::AnchorId;

/// Result type for fusion and calibration operations
pub type FusionResult<T> = Result<T, FusionError>;

/// Reasons the fusion core held its previous state
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FusionError {
    /// A required anchor range is absent or unusable this tick
    #[error("Missing range measurement for anchor {anchor}")]
    MissingMeasurement {
        /// Anchor whose range was missing
        anchor: AnchorId,
    },

    /// Anchor geometry cannot produce a unique position
    #[error("Degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// What made the geometry unusable
        reason: &'static str,
    },

    /// Orientation quaternion is non-finite or has zero length
    #[error("Invalid orientation quaternion")]
    InvalidOrientation,

    /// Calibration has not reached the state this operation needs
    #[error("Calibration incomplete")]
    CalibrationIncomplete,

    /// Calibration is complete and must be reset before re-running a step
    #[error("Calibration already complete; reset before recalibrating")]
    CalibrationLocked,

    /// Configuration value outside its legal range
    #[error("Invalid parameter: {name}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
    },
}

impl FusionError {
    /// Whether the condition clears by itself on a later tick
    ///
    /// Transient errors come from a single bad packet. The rest need a user
    /// action (calibrate, reset) or a code fix.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::MissingMeasurement { .. } | Self::InvalidOrientation | Self::DegenerateGeometry { .. }
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FusionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MissingMeasurement { anchor } =>
                defmt::write!(fmt, "Missing range for anchor {}", anchor.0),
            Self::DegenerateGeometry { reason } =>
                defmt::write!(fmt, "Degenerate geometry: {}", reason),
            Self::InvalidOrientation =>
                defmt::write!(fmt, "Invalid orientation"),
            Self::CalibrationIncomplete =>
                defmt::write!(fmt, "Calibration incomplete"),
            Self::CalibrationLocked =>
                defmt::write!(fmt, "Calibration locked"),
            Self::InvalidParameter { name } =>
                defmt::write!(fmt, "Invalid parameter: {}", name),
        }
    }
}
