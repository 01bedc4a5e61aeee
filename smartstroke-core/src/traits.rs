//! Core traits shared across the fusion pipeline
//!
//! Two small seams keep the engine generic without dynamic dispatch:
//!
//! - [`ScalarFilter`]: anything that turns a noisy scalar stream into a
//!   smoothed one (Kalman, exponential). The engine drives both kinds the
//!   same way and resets them together.
//! - [`Validatable`]: a finiteness/shape check run on every sensor value
//!   before it may touch filter state. NaN must never reach a filter.

/// One-dimensional streaming filter
pub trait ScalarFilter {
    /// Feed one measurement, return the current estimate
    fn filter(&mut self, measurement: f32) -> f32;

    /// Current estimate, `None` until the first measurement
    fn value(&self) -> Option<f32>;

    /// Forget all history; the next measurement is taken as-is
    fn reset(&mut self);

    /// Whether at least one measurement has been absorbed
    fn is_initialized(&self) -> bool {
        self.value().is_some()
    }
}

/// Trait for values that can be checked before use
pub trait Validatable {
    /// Check if the value is usable (finite, well-formed)
    fn is_valid(&self) -> bool;
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl<T: Validatable> Validatable for Option<T> {
    fn is_valid(&self) -> bool {
        self.as_ref().map_or(false, Validatable::is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validatable_floats() {
        assert!(5.0f32.is_valid());
        assert!(!f32::NAN.is_valid());
        assert!(!f32::INFINITY.is_valid());
        assert!(!f64::NEG_INFINITY.is_valid());
    }

    #[test]
    fn validatable_options() {
        assert!(Some(1.0f32).is_valid());
        assert!(!None::<f32>.is_valid());
        assert!(!Some(f32::NAN).is_valid());
    }
}
