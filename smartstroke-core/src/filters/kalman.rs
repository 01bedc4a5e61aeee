//! Scalar Kalman Filter for Per-Axis Position Smoothing
//!
//! ## Overview
//!
//! The UWB position is filtered one axis at a time with a 1D Kalman filter.
//! Each axis is an independent random walk (`A = 1`) observed directly
//! (`C = 1`), so the full matrix machinery collapses to a handful of scalar
//! operations.
//!
//! ## Filter Equations
//!
//! ### 1. Prediction Step
//! ```text
//! State prediction:      x̂ₖ|ₖ₋₁ = A·xₖ₋₁
//! Covariance prediction: Pₖ|ₖ₋₁ = A·Pₖ₋₁·A + Q
//! ```
//!
//! ### 2. Update Step
//! ```text
//! Kalman gain:  Kₖ = Pₖ|ₖ₋₁·C / (C·Pₖ|ₖ₋₁·C + R)
//! State update: x̂ₖ = x̂ₖ|ₖ₋₁ + Kₖ·(zₖ - C·x̂ₖ|ₖ₋₁)
//! Covariance:   Pₖ = Pₖ|ₖ₋₁ - Kₖ·C·Pₖ|ₖ₋₁
//! ```
//!
//! ## Runtime Stiffness
//!
//! `Q` is deliberately public and mutable. The fusion engine rewrites it on
//! every tick to switch between "locked while writing", "stiff while hovering
//! near the last mark" and "responsive while travelling". Lower `Q` means the
//! filter trusts its history more than new measurements.
//!
//! ## Usage Example
//!
//! ```rust
//! use smartstroke_core::filters::ScalarKalmanFilter;
//! use smartstroke_core::traits::ScalarFilter;
//!
//! let mut kf = ScalarKalmanFilter::new(6.0, 0.005);
//! assert_eq!(kf.filter(120.0), 120.0); // first sample passes through
//!
//! kf.q = 0.0001; // lock down while the pen is writing
//! let estimate = kf.filter(124.0);
//! assert!(estimate > 120.0 && estimate < 124.0);
//! ```

use crate::traits::ScalarFilter;

/// One-dimensional Kalman estimator with tunable process noise
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarKalmanFilter {
    /// Measurement noise (R), fixed at construction
    r: f32,
    /// Process noise (Q), retuned by the caller between calls
    pub q: f32,
    /// State transition coefficient (A)
    a: f32,
    /// Observation coefficient (C)
    c: f32,
    /// Current estimate, `None` before the first measurement
    x: Option<f32>,
    /// Estimation error covariance
    cov: f32,
}

impl ScalarKalmanFilter {
    /// Create a filter with measurement noise `r` and initial process noise `q`
    pub fn new(r: f32, q: f32) -> Self {
        Self {
            r,
            q,
            a: 1.0,
            c: 1.0,
            x: None,
            cov: 0.0,
        }
    }

    /// Measurement noise (R)
    pub fn measurement_noise(&self) -> f32 {
        self.r
    }

    /// Current error covariance; equals R right after the first sample
    pub fn covariance(&self) -> f32 {
        self.cov
    }

    /// Current estimate, if any measurement has been absorbed
    pub fn estimate(&self) -> Option<f32> {
        self.x
    }
}

impl ScalarFilter for ScalarKalmanFilter {
    fn filter(&mut self, measurement: f32) -> f32 {
        let x = match self.x {
            Some(x) => x,
            None => {
                // No history to trust yet
                self.x = Some(measurement);
                self.cov = self.r;
                return measurement;
            }
        };

        // Predict
        let pred_x = self.a * x;
        let pred_cov = self.a * self.cov * self.a + self.q;

        // Update
        let gain = pred_cov * self.c / (self.c * pred_cov * self.c + self.r);
        let updated = pred_x + gain * (measurement - self.c * pred_x);
        self.cov = pred_cov - gain * self.c * pred_cov;
        self.x = Some(updated);

        updated
    }

    fn value(&self) -> Option<f32> {
        self.x
    }

    fn reset(&mut self) {
        self.x = None;
        self.cov = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_measurement_passes_through() {
        let mut kf = ScalarKalmanFilter::new(6.0, 0.005);
        assert!(!kf.is_initialized());

        assert_eq!(kf.filter(42.0), 42.0);
        assert_eq!(kf.covariance(), 6.0);
        assert_eq!(kf.value(), Some(42.0));
    }

    #[test]
    fn one_step_matches_hand_computation() {
        let mut kf = ScalarKalmanFilter::new(6.0, 0.5);
        kf.filter(10.0);

        // predCov = 6 + 0.5 = 6.5, K = 6.5 / 12.5 = 0.52
        let estimate = kf.filter(20.0);
        assert!((estimate - 15.2).abs() < 1e-4);
        assert!((kf.covariance() - (6.5 - 0.52 * 6.5)).abs() < 1e-4);
    }

    #[test]
    fn tiny_q_converges_on_constant() {
        let mut kf = ScalarKalmanFilter::new(6.0, 1e-9);
        kf.filter(0.0);

        // Step to a new constant level; with Q ~ 0 the estimate approaches
        // the running mean, so it closes in slowly but steadily
        for _ in 0..5000 {
            kf.filter(100.0);
        }
        assert!((kf.value().unwrap() - 100.0).abs() < 0.5);
        assert!(kf.covariance() < 0.01);
    }

    #[test]
    fn large_q_tracks_within_one_step() {
        let mut kf = ScalarKalmanFilter::new(6.0, 1e6);
        kf.filter(0.0);

        let estimate = kf.filter(250.0);
        assert!((estimate - 250.0).abs() < 0.01);
    }

    #[test]
    fn lower_q_is_stiffer() {
        let mut stiff = ScalarKalmanFilter::new(6.0, 0.0001);
        let mut loose = ScalarKalmanFilter::new(6.0, 0.005);
        for _ in 0..50 {
            stiff.filter(0.0);
            loose.filter(0.0);
        }

        let stiff_jump = stiff.filter(30.0);
        let loose_jump = loose.filter(30.0);
        assert!(stiff_jump < loose_jump);
    }

    #[test]
    fn reset_forgets_history() {
        let mut kf = ScalarKalmanFilter::new(6.0, 0.005);
        kf.filter(5.0);
        kf.filter(6.0);
        kf.reset();

        assert_eq!(kf.value(), None);
        assert_eq!(kf.filter(300.0), 300.0);
    }

    #[test]
    fn nan_propagates() {
        let mut kf = ScalarKalmanFilter::new(6.0, 0.005);
        kf.filter(1.0);
        assert!(kf.filter(f32::NAN).is_nan());
    }
}
