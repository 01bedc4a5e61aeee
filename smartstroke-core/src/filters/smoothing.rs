//! Single-pole exponential smoother
//!
//! Used on the IMU-derived tip offset, which is responsive but carries
//! micro-tremor and quantization steps. Independent of the Kalman filters
//! that handle absolute position.
//!
//! ```text
//! value ← value + α·(input − value)
//! ```
//!
//! Higher α is more responsive and less smooth. α = 1 passes input through.

use crate::{
    errors::{FusionError, FusionResult},
    traits::ScalarFilter,
};

/// Exponential moving average with an explicit "no value yet" state
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialSmoother {
    alpha: f32,
    value: Option<f32>,
}

impl ExponentialSmoother {
    /// Create a smoother; `alpha` must lie in (0, 1]
    pub fn new(alpha: f32) -> FusionResult<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(FusionError::InvalidParameter { name: "alpha" });
        }

        Ok(Self { alpha, value: None })
    }

    /// Smoothing factor
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl ScalarFilter for ExponentialSmoother {
    fn filter(&mut self, input: f32) -> f32 {
        let next = match self.value {
            None => input,
            Some(value) => value + self.alpha * (input - value),
        };
        self.value = Some(next);
        next
    }

    fn value(&self) -> Option<f32> {
        self.value
    }

    fn reset(&mut self) {
        self.value = None;
    }
}
