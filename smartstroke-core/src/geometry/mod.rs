//! Planar geometry primitives
//!
//! All positions on the writing surface are 2D. World coordinates are in
//! millimeters with anchor 1 at the origin; output coordinates are world
//! coordinates multiplied by the calibration scale.

use core::fmt;

use crate::traits::Validatable;

pub mod orientation;
pub mod trilateration;

pub use orientation::{angle_diff, yaw_pitch, Quaternion};
pub use trilateration::trilaterate;

/// UWB short address identifying one anchor radio
///
/// Tag firmware prints short addresses as hex text (`"1786"`, `"5B82"`), so
/// the literal `0x1786` is the anchor that reports as `"1786"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorId(pub u16);

impl AnchorId {
    /// Parse a short address as printed by the firmware
    ///
    /// Accepts 1 to 4 hex digits in either case; anything else is `None`.
    pub fn from_hex(text: &str) -> Option<AnchorId> {
        let text = text.trim();
        if text.is_empty() || text.len() > 4 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u16::from_str_radix(text, 16).ok().map(AnchorId)
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// A point on the writing surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point2 {
    /// Anchor 1, the calibrated origin
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    /// Create a new instance
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: Point2) -> f32 {
        libm::hypotf(self.x - other.x, self.y - other.y)
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(&self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Linear interpolation toward `target`; `amount = 0` stays, `1` arrives
    pub fn lerp(&self, target: Point2, amount: f32) -> Point2 {
        Point2::new(
            (1.0 - amount) * self.x + amount * target.x,
            (1.0 - amount) * self.y + amount * target.y,
        )
    }

    /// Multiply both coordinates by `factor`
    pub fn scaled(&self, factor: f32) -> Point2 {
        Point2::new(self.x * factor, self.y * factor)
    }

    /// Component-wise sum
    pub fn offset_by(&self, dx: f32, dy: f32) -> Point2 {
        Point2::new(self.x + dx, self.y + dy)
    }
}

impl Validatable for Point2 {
    fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Lower-left corner
    pub min: Point2,
    /// Upper-right corner
    pub max: Point2,
}

impl Rect {
    /// Rectangle spanning `[0, width] × [0, height]`
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            min: Point2::ORIGIN,
            max: Point2::new(width, height),
        }
    }

    /// Horizontal extent
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical extent
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Nearest point inside the rectangle
    pub fn clamp(&self, point: Point2) -> Point2 {
        Point2::new(
            point.x.max(self.min.x).min(self.max.x),
            point.y.max(self.min.y).min(self.max.y),
        )
    }

    /// True if `point` lies inside or on the edge
    pub fn contains(&self, point: Point2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Scale both corners by `factor`
    pub fn scaled(&self, factor: f32) -> Rect {
        Rect {
            min: self.min.scaled(factor),
            max: self.max.scaled(factor),
        }
    }
}

/// An anchor radio at a resolved world position (mm)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor {
    /// Radio short address
    pub id: AnchorId,
    /// Position in world mm
    pub position: Point2,
}

impl Anchor {
    /// Create a new instance
    pub const fn new(id: AnchorId, position: Point2) -> Self {
        Self { id, position }
    }
}
