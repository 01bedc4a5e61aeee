//! Orientation math for the pen IMU
//!
//! The pen reports its attitude as a unit quaternion `(r, i, j, k)`. The
//! fusion engine only needs two angles from it: yaw (rotation about the
//! surface normal) and pitch (tilt toward/away from the writer). Their change
//! since pen-down is turned into a tip displacement.
//!
//! ## Gimbal Lock Guard
//!
//! ```text
//! sinp = 2(r·j − k·i)
//! pitch = ±π/2            if |sinp| ≥ 1   (sign of sinp)
//!         asin(sinp)      otherwise
//! ```
//!
//! Sensor noise pushes `sinp` slightly past ±1 near vertical, and `asin`
//! returns NaN there. The guard clamps instead.

use core::f32::consts::{FRAC_PI_2, PI};

use crate::{
    errors::{FusionError, FusionResult},
    traits::Validatable,
};

/// Orientation quaternion as reported by the pen (scalar first)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    /// Scalar part
    pub r: f32,
    /// First vector part
    pub i: f32,
    /// Second vector part
    pub j: f32,
    /// Third vector part
    pub k: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// No rotation
    pub const IDENTITY: Quaternion = Quaternion { r: 1.0, i: 0.0, j: 0.0, k: 0.0 };

    /// Create a new instance
    pub const fn new(r: f32, i: f32, j: f32, k: f32) -> Self {
        Self { r, i, j, k }
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        libm::sqrtf(self.r * self.r + self.i * self.i + self.j * self.j + self.k * self.k)
    }

    /// Unit-length copy of this quaternion
    ///
    /// Fails with `InvalidOrientation` on NaN/infinite components or a
    /// zero-length quaternion.
    pub fn normalized(&self) -> FusionResult<Quaternion> {
        if !self.is_valid() {
            return Err(FusionError::InvalidOrientation);
        }

        let norm = self.norm();
        if !(norm > f32::EPSILON) || !norm.is_finite() {
            return Err(FusionError::InvalidOrientation);
        }

        Ok(Quaternion::new(self.r / norm, self.i / norm, self.j / norm, self.k / norm))
    }

    /// Rotation of `angle` radians about the vertical (yaw) axis
    pub fn from_yaw(angle: f32) -> Quaternion {
        let half = angle / 2.0;
        Quaternion::new(libm::cosf(half), 0.0, 0.0, libm::sinf(half))
    }

    /// Rotation of `angle` radians about the pitch axis
    pub fn from_pitch(angle: f32) -> Quaternion {
        let half = angle / 2.0;
        Quaternion::new(libm::cosf(half), 0.0, libm::sinf(half), 0.0)
    }
}

impl Validatable for Quaternion {
    fn is_valid(&self) -> bool {
        self.r.is_finite() && self.i.is_finite() && self.j.is_finite() && self.k.is_finite()
    }
}

/// Yaw and pitch extracted from a pen orientation, in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct YawPitch {
    /// Rotation about the surface normal
    pub yaw: f32,
    /// Tilt toward or away from the writer
    pub pitch: f32,
}

/// Extract yaw and pitch from a quaternion
pub fn yaw_pitch(q: &Quaternion) -> YawPitch {
    let sinp = 2.0 * (q.r * q.j - q.k * q.i);
    let pitch = if libm::fabsf(sinp) >= 1.0 {
        if sinp > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 }
    } else {
        libm::asinf(sinp)
    };

    let yaw = libm::atan2f(
        2.0 * (q.r * q.k + q.i * q.j),
        1.0 - 2.0 * (q.j * q.j + q.k * q.k),
    );

    YawPitch { yaw, pitch }
}

/// Signed shortest angular distance from `b` to `a`, in `(−π, π]`
///
/// Orientation crossing the ±π seam must read as a small step, not a
/// near-full-turn jump.
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let two_pi = 2.0 * PI;
    let shifted = (a - b) + PI;
    let wrapped = shifted - two_pi * libm::floorf(shifted / two_pi) - PI;

    // Rounding can land a hair outside the range on either side of the seam
    if wrapped <= -PI || wrapped > PI {
        PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-5;

    #[test]
    fn identity_has_no_rotation() {
        let angles = yaw_pitch(&Quaternion::IDENTITY);
        assert!(angles.yaw.abs() < TOL);
        assert!(angles.pitch.abs() < TOL);
    }

    #[test]
    fn yaw_round_trips() {
        let angles = yaw_pitch(&Quaternion::from_yaw(0.3));
        assert!((angles.yaw - 0.3).abs() < TOL);
        assert!(angles.pitch.abs() < TOL);
    }

    #[test]
    fn pitch_round_trips() {
        let angles = yaw_pitch(&Quaternion::from_pitch(-0.2));
        assert!((angles.pitch + 0.2).abs() < TOL);
        assert!(angles.yaw.abs() < TOL);
    }

    #[test]
    fn gimbal_lock_is_clamped_not_nan() {
        // sinp = 2·(r·j) slightly above 1 from an un-normalized reading
        let q = Quaternion::new(0.7072, 0.0, 0.7072, 0.0);
        let angles = yaw_pitch(&q);
        assert_eq!(angles.pitch, FRAC_PI_2);

        let q = Quaternion::new(0.7072, 0.0, -0.7072, 0.0);
        assert_eq!(yaw_pitch(&q).pitch, -FRAC_PI_2);
    }

    #[test]
    fn normalization_rejects_garbage() {
        assert_eq!(
            Quaternion::new(f32::NAN, 0.0, 0.0, 0.0).normalized(),
            Err(FusionError::InvalidOrientation)
        );
        assert_eq!(
            Quaternion::new(0.0, 0.0, 0.0, 0.0).normalized(),
            Err(FusionError::InvalidOrientation)
        );

        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0).normalized().unwrap();
        assert!((q.norm() - 1.0).abs() < TOL);
    }

    #[test]
    fn angle_diff_wraps_across_seam() {
        // 179° and -179° are 2° apart, not 358°
        let a = 179f32.to_radians();
        let b = (-179f32).to_radians();
        let d = angle_diff(a, b);
        assert!((d - (-2f32).to_radians()).abs() < 1e-4);
        assert!((angle_diff(b, a) - 2f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn angle_diff_boundary_maps_to_plus_pi() {
        assert_eq!(angle_diff(PI, 0.0), PI);
        assert_eq!(angle_diff(0.0, PI), PI);
    }

    #[test]
    fn angle_diff_small_values_unchanged() {
        assert!((angle_diff(0.5, 0.2) - 0.3).abs() < TOL);
        assert!((angle_diff(0.2, 0.5) + 0.3).abs() < TOL);
    }
}
