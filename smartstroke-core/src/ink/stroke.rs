//! Strokes and curve smoothing
//!
//! Positions arrive at the tick rate, which is coarse for handwriting. Drawing
//! straight lines between them gives visible corners, so each new point
//! closes a quadratic curve through the previous one:
//!
//! ```text
//!        p[n-1]                       control = p[n-1]
//!        ╱    ╲                       from    = mid(p[n-2], p[n-1])
//!  mid ─╯      ╰─ mid                 to      = mid(p[n-1], p[n])
//!   ╱              ╲
//! p[n-2]          p[n]
//! ```
//!
//! Consecutive curves share their midpoint endpoints, so the rendered path is
//! continuous and passes through every midpoint in order.

use alloc::vec::Vec;
use core::fmt;

use crate::{constants::hardware::PRESSURE_MAX, geometry::Point2};

/// An sRGB ink color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokeColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl StrokeColor {
    /// `#1e3a8a`, the default ink
    pub const NAVY: StrokeColor = StrokeColor::rgb(0x1e, 0x3a, 0x8a);
    /// `#f97316`
    pub const ORANGE: StrokeColor = StrokeColor::rgb(0xf9, 0x73, 0x16);
    /// `#ef4444`
    pub const RED: StrokeColor = StrokeColor::rgb(0xef, 0x44, 0x44);
    /// `#22c55e`
    pub const GREEN: StrokeColor = StrokeColor::rgb(0x22, 0xc5, 0x5e);
    /// `#000000`
    pub const BLACK: StrokeColor = StrokeColor::rgb(0x00, 0x00, 0x00);

    /// Colors offered by the pen UI, default first
    pub const PALETTE: [StrokeColor; 5] = [
        Self::NAVY,
        Self::ORANGE,
        Self::RED,
        Self::GREEN,
        Self::BLACK,
    ];

    /// Color from its channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }

        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::NAVY
    }
}

impl fmt::Display for StrokeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One recorded ink sample in output units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokePoint {
    /// Horizontal position in output units
    pub x: f32,
    /// Vertical position in output units
    pub y: f32,
    /// Raw pressure reading, `0..=PRESSURE_MAX`
    pub pressure: u16,
}

impl StrokePoint {
    /// Create a new instance
    pub fn new(position: Point2, pressure: u16) -> Self {
        Self {
            x: position.x,
            y: position.y,
            pressure,
        }
    }

    /// Point as a plain position
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Rendered line width: 1 at no pressure, 4 at full scale
    pub fn line_width(&self) -> f32 {
        let weight = f32::from(self.pressure.min(PRESSURE_MAX)) / f32::from(PRESSURE_MAX);
        1.0 + 3.0 * weight
    }
}

/// One piece of a rendered stroke path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveSegment {
    /// Straight line
    Line {
        /// Start point
        from: Point2,
        /// End point
        to: Point2,
        /// Line width
        width: f32,
    },
    /// Quadratic Bézier
    Quadratic {
        /// Start point
        from: Point2,
        /// Control point the curve bends toward
        control: Point2,
        /// End point
        to: Point2,
        /// Line width
        width: f32,
    },
}

impl CurveSegment {
    /// Where the segment begins
    pub fn start(&self) -> Point2 {
        match *self {
            Self::Line { from, .. } | Self::Quadratic { from, .. } => from,
        }
    }

    /// Where the segment ends
    pub fn end(&self) -> Point2 {
        match *self {
            Self::Line { to, .. } | Self::Quadratic { to, .. } => to,
        }
    }

    /// Line width for the whole segment
    pub fn width(&self) -> f32 {
        match *self {
            Self::Line { width, .. } | Self::Quadratic { width, .. } => width,
        }
    }
}

/// A sealed stroke: points plus the color it was drawn in
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stroke {
    points: Vec<StrokePoint>,
    color: StrokeColor,
}

impl Stroke {
    /// Sealed stroke from its points and ink color
    pub fn new(points: Vec<StrokePoint>, color: StrokeColor) -> Self {
        Self { points, color }
    }

    /// Points in drawing order
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    /// Ink color
    pub fn color(&self) -> StrokeColor {
        self.color
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Full redraw path
    ///
    /// Starts at the first point, curves through each interior point to the
    /// following midpoint, and finishes with a line to the last point. A
    /// stroke with fewer than two points has no path.
    pub fn segments(&self) -> Vec<CurveSegment> {
        let points = &self.points;
        if points.len() < 2 {
            return Vec::new();
        }

        let mut segments = Vec::with_capacity(points.len() - 1);
        let mut cursor = points[0].position();

        for pair in points[1..].windows(2) {
            let (control, next) = (pair[0], pair[1]);
            let to = control.position().midpoint(next.position());
            segments.push(CurveSegment::Quadratic {
                from: cursor,
                control: control.position(),
                to,
                width: control.line_width(),
            });
            cursor = to;
        }

        let last = points[points.len() - 1];
        segments.push(CurveSegment::Line {
            from: cursor,
            to: last.position(),
            width: last.line_width(),
        });

        segments
    }
}

/// Accumulates the stroke in progress
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    points: Vec<StrokePoint>,
    color: StrokeColor,
}

impl StrokeRecorder {
    /// Idle recorder with the default color
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pen-down sample and return the segment to draw for it
    ///
    /// The first point of a stroke draws nothing; the second draws a line;
    /// every later point draws one quadratic.
    pub fn push(&mut self, point: StrokePoint) -> Option<CurveSegment> {
        self.points.push(point);

        let width = point.line_width();
        match self.points.as_slice() {
            [] | [_] => None,
            [first, second] => Some(CurveSegment::Line {
                from: first.position(),
                to: second.position(),
                width,
            }),
            [.., before, previous, last] => Some(CurveSegment::Quadratic {
                from: before.position().midpoint(previous.position()),
                control: previous.position(),
                to: previous.position().midpoint(last.position()),
                width,
            }),
        }
    }

    /// Seal the stroke in progress, if there is one
    pub fn lift(&mut self) -> Option<Stroke> {
        if self.points.is_empty() {
            return None;
        }

        let points = core::mem::take(&mut self.points);
        Some(Stroke::new(points, self.color))
    }

    /// Color for the stroke in progress and the ones after it
    pub fn set_color(&mut self, color: StrokeColor) {
        self.color = color;
    }

    /// Color of the stroke in progress
    pub fn color(&self) -> StrokeColor {
        self.color
    }

    /// Points of the stroke in progress
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    /// True while a stroke is open
    pub fn is_drawing(&self) -> bool {
        !self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32) -> StrokePoint {
        StrokePoint::new(Point2::new(x, y), 2048)
    }

    #[test]
    fn palette_and_hex() {
        assert_eq!(StrokeColor::default(), StrokeColor::PALETTE[0]);
        assert_eq!(StrokeColor::from_hex("#f97316"), Some(StrokeColor::ORANGE));
        assert_eq!(StrokeColor::from_hex("22c55e"), Some(StrokeColor::GREEN));
        assert_eq!(StrokeColor::from_hex("#12345"), None);
        assert_eq!(StrokeColor::from_hex("#zzzzzz"), None);
        assert_eq!(std::format!("{}", StrokeColor::NAVY), "#1e3a8a");
    }

    #[test]
    fn line_width_scales_with_pressure() {
        assert_eq!(StrokePoint::new(Point2::ORIGIN, 0).line_width(), 1.0);
        assert_eq!(StrokePoint::new(Point2::ORIGIN, PRESSURE_MAX).line_width(), 4.0);
        // Out-of-range readings saturate
        assert_eq!(StrokePoint::new(Point2::ORIGIN, u16::MAX).line_width(), 4.0);
    }

    #[test]
    fn incremental_segments() {
        let mut recorder = StrokeRecorder::new();

        assert_eq!(recorder.push(pt(0.0, 0.0)), None);

        match recorder.push(pt(10.0, 0.0)) {
            Some(CurveSegment::Line { from, to, .. }) => {
                assert_eq!(from, Point2::new(0.0, 0.0));
                assert_eq!(to, Point2::new(10.0, 0.0));
            }
            other => panic!("expected line, got {:?}", other),
        }

        match recorder.push(pt(20.0, 10.0)) {
            Some(CurveSegment::Quadratic { from, control, to, .. }) => {
                assert_eq!(from, Point2::new(5.0, 0.0));
                assert_eq!(control, Point2::new(10.0, 0.0));
                assert_eq!(to, Point2::new(15.0, 5.0));
            }
            other => panic!("expected quadratic, got {:?}", other),
        }
    }

    #[test]
    fn lift_seals_once() {
        let mut recorder = StrokeRecorder::new();
        assert_eq!(recorder.lift(), None);

        recorder.set_color(StrokeColor::RED);
        recorder.push(pt(1.0, 1.0));
        recorder.push(pt(2.0, 2.0));

        let stroke = recorder.lift().unwrap();
        assert_eq!(stroke.len(), 2);
        assert_eq!(stroke.color(), StrokeColor::RED);
        assert!(!recorder.is_drawing());
        assert_eq!(recorder.lift(), None);
    }

    #[test]
    fn redraw_path_is_continuous() {
        let points = [pt(0.0, 0.0), pt(10.0, 0.0), pt(20.0, 10.0), pt(30.0, 10.0)].to_vec();
        let stroke = Stroke::new(points, StrokeColor::default());
        let segments = stroke.segments();

        // Two interior points, then the closing line
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].start(), Point2::new(0.0, 0.0));
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        assert_eq!(segments[2].end(), Point2::new(30.0, 10.0));
        assert!(matches!(segments[2], CurveSegment::Line { .. }));
    }

    #[test]
    fn short_strokes_have_no_redraw_path() {
        let stroke = Stroke::new([pt(0.0, 0.0)].to_vec(), StrokeColor::default());
        assert!(stroke.segments().is_empty());

        let stroke = Stroke::new([pt(0.0, 0.0), pt(5.0, 5.0)].to_vec(), StrokeColor::default());
        assert_eq!(
            stroke.segments(),
            [CurveSegment::Line {
                from: Point2::new(0.0, 0.0),
                to: Point2::new(5.0, 5.0),
                width: pt(5.0, 5.0).line_width(),
            }]
            .to_vec()
        );
    }
}
