//! Pen Hardware Constants
//!
//! Physical characteristics of the stylus and the anchor network it ranges
//! against.

use crate::geometry::AnchorId;

/// Distance from the pen's IMU to the nib, in millimeters.
///
/// Tilt is converted to tip displacement with this lever arm.
///
/// Source: Pen enclosure drawing
pub const PEN_LENGTH_MM: f32 = 140.0;

/// Full-scale reading of the pressure sensor ADC.
///
/// Source: 12-bit ADC on the pen MCU
pub const PRESSURE_MAX: u16 = 4095;

/// Pressure reading above which the pen counts as touching the surface.
///
/// Source: Force-sensitive resistor resting offset plus margin
pub const PRESSURE_THRESHOLD: u16 = 200;

/// Range reported in meters by the tag firmware; the core works in mm.
pub const MM_PER_METER: f32 = 1000.0;

/// Short address of the origin anchor.
pub const ANCHOR_1_ID: AnchorId = AnchorId(0x1786);

/// Short address of the anchor that defines the X axis.
pub const ANCHOR_2_ID: AnchorId = AnchorId(0x1685);

/// Short address of the third anchor.
pub const ANCHOR_3_ID: AnchorId = AnchorId(0x1584);

/// Maximum number of anchor links a single telemetry frame may carry.
///
/// The tag firmware reports at most one link per anchor it hears; a handful
/// of spare slots tolerates stray anchors in range.
pub const MAX_LINKS: usize = 8;
