//! Common test utilities for integration tests
//!
//! This module provides:
//! - A fixed anchor layout and a session calibrated against it
//! - Telemetry frames synthesized from a true pen position
//! - A small deterministic RNG for range noise

#![allow(dead_code)]

use smartstroke_core::{
    constants::hardware::{ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID},
    time::Timestamp,
    CalibrationMap, FusionConfig, InkSession, Point2, Quaternion, TelemetryFrame,
};

pub mod generators;

/// Anchor positions used by every scenario, in mm
///
/// Right angle at anchor 1 so the calibrated frame matches this one exactly.
pub const ANCHORS_MM: [Point2; 3] = [
    Point2::new(0.0, 0.0),
    Point2::new(600.0, 0.0),
    Point2::new(0.0, 400.0),
];

/// Pressure well above the contact threshold
pub const PEN_DOWN: u16 = 1200;

/// No contact
pub const PEN_UP: u16 = 0;

/// Deterministic xorshift RNG
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16777216.0
    }

    pub fn gen_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Frame as the pen at `world` (mm) would report it
///
/// `noise_mm` adds uniform error of that amplitude to each range.
pub fn frame_at(
    world: Point2,
    timestamp: Timestamp,
    pressure: u16,
    orientation: Quaternion,
    rng: Option<(&mut TestRng, f32)>,
) -> TelemetryFrame {
    let ids = [ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID];
    let mut frame = TelemetryFrame::new(timestamp)
        .with_pressure(pressure)
        .with_orientation(orientation);

    let mut rng = rng;
    for (id, anchor) in ids.iter().zip(ANCHORS_MM.iter()) {
        let noise = match rng.as_mut() {
            Some((rng, amplitude)) => rng.gen_range(-*amplitude, *amplitude),
            None => 0.0,
        };
        let range_mm = (world.distance_to(*anchor) + noise).max(0.0);
        frame = frame.with_link(*id, range_mm / 1000.0);
    }

    frame
}

/// Session calibrated by touching anchors 1 and 2
pub fn calibrated_session() -> (InkSession, CalibrationMap) {
    let mut session = InkSession::new(FusionConfig::default()).unwrap();

    session.ingest(&frame_at(ANCHORS_MM[0], 0, PEN_UP, Quaternion::IDENTITY, None));
    session.calibrate_origin().unwrap();

    session.ingest(&frame_at(ANCHORS_MM[1], 1, PEN_UP, Quaternion::IDENTITY, None));
    let map = session.calibrate_width().unwrap();

    (session, map)
}

/// Distance between two output-unit points, expressed in mm
pub fn error_mm(map: &CalibrationMap, a: Point2, b: Point2) -> f32 {
    map.to_mm(a.distance_to(b))
}
