//! Scripted pen paths
//!
//! A path is a list of waypoints walked at constant speed. Dwell segments
//! (repeated waypoints) let filters settle before and after motion.

use smartstroke_core::Point2;

/// One leg of a scripted path
#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub to: Point2,
    pub ticks: usize,
}

/// Piecewise-linear pen trajectory sampled once per tick
#[derive(Debug, Clone)]
pub struct ScriptedPath {
    start: Point2,
    legs: Vec<Leg>,
}

impl ScriptedPath {
    pub fn starting_at(start: Point2) -> Self {
        Self {
            start,
            legs: Vec::new(),
        }
    }

    /// Stay put for `ticks`
    pub fn dwell(mut self, ticks: usize) -> Self {
        let at = self.end();
        self.legs.push(Leg { to: at, ticks });
        self
    }

    /// Move in a straight line to `to` over `ticks`
    pub fn line_to(mut self, to: Point2, ticks: usize) -> Self {
        self.legs.push(Leg { to, ticks });
        self
    }

    pub fn end(&self) -> Point2 {
        self.legs.last().map_or(self.start, |leg| leg.to)
    }

    /// Every tick's true position, in order
    pub fn samples(&self) -> Vec<Point2> {
        let mut out = Vec::new();
        let mut from = self.start;

        for leg in &self.legs {
            for step in 1..=leg.ticks {
                out.push(from.lerp(leg.to, step as f32 / leg.ticks as f32));
            }
            from = leg.to;
        }

        out
    }
}

/// `n` evenly spaced points on the segment from `a` to `b`, both ends included
pub fn collinear_points(a: Point2, b: Point2, n: usize) -> Vec<Point2> {
    (0..n)
        .map(|i| a.lerp(b, i as f32 / (n - 1) as f32))
        .collect()
}
