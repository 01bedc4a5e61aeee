//! Scalar filters for position and orientation signals
//!
//! ```text
//! UWB x ──→ ScalarKalmanFilter ──┐
//! UWB y ──→ ScalarKalmanFilter ──┼─→ fused target
//! IMU Δ ──→ ExponentialSmoother ─┘
//! ```
//!
//! Both implement [`ScalarFilter`](crate::traits::ScalarFilter).

pub mod kalman;
pub mod smoothing;

pub use kalman::ScalarKalmanFilter;
pub use smoothing::ExponentialSmoother;
