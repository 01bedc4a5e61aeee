//! Constants for SmartStroke Core
//!
//! Every tuning value the fusion engine uses is defined here with a note on
//! where it came from. The engine never reads these directly; they seed
//! [`FusionConfig::default`](crate::engine::FusionConfig) and
//! [`CalibrationConfig::default`](crate::calibration::CalibrationConfig), so a
//! deployment can retune without touching code.
//!
//! ## Organization
//!
//! - **Tuning**: filter noise levels, stiffness policy, interpolation factors
//! - **Hardware**: pen geometry, pressure ADC, anchor addresses
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Keep units in the name (`_MM`, `_PX`)
//! 3. Epsilons here are load-bearing against real sensor noise; do not
//!    "clean them up"

/// Filter and fusion-policy tuning values.
pub mod tuning;

/// Pen hardware characteristics and anchor addressing.
pub mod hardware;

// Re-export commonly used constants for convenience
pub use tuning::{
    KALMAN_MEASUREMENT_NOISE, KALMAN_PROCESS_NOISE_DEFAULT,
    KALMAN_PROCESS_NOISE_HOVER_NEAR, KALMAN_PROCESS_NOISE_LOCKED,
    HOVER_RADIUS_MM, TRILATERATION_EPSILON, TARGET_OUTPUT_SPAN,
};

pub use hardware::{
    PEN_LENGTH_MM, PRESSURE_MAX, PRESSURE_THRESHOLD,
    ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID,
};
