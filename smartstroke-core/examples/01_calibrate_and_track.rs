//! Calibration and Tracking Example
//!
//! Walks through the two-tap calibration and then tracks a pen hovering
//! along a simulated path, printing how far the fused cursor is from the
//! truth.
//!
//! ## What You'll Learn
//!
//! - How the anchor layout is derived from ranges alone
//! - How the output scale relates to the calibrated surface
//! - How the Kalman stiffness policy trades lag for stability
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_calibrate_and_track
//! ```

use smartstroke_core::{
    constants::hardware::{ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID},
    time::{FixedTime, TimeSource},
    FusionConfig, InkSession, Point2, Quaternion, TelemetryFrame,
};

/// Where the anchors really are (mm); the session never sees this
const TRUE_ANCHORS: [Point2; 3] = [
    Point2::new(0.0, 0.0),
    Point2::new(500.0, 0.0),
    Point2::new(120.0, 350.0),
];

fn frame_at(pen: Point2, clock: &FixedTime, pressure: u16) -> TelemetryFrame {
    let ids = [ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID];
    let mut frame = TelemetryFrame::new(clock.now())
        .with_pressure(pressure)
        .with_orientation(Quaternion::IDENTITY);
    for (id, anchor) in ids.iter().zip(TRUE_ANCHORS.iter()) {
        frame = frame.with_link(*id, pen.distance_to(*anchor) / 1000.0);
    }
    frame
}

fn main() {
    println!("SmartStroke Calibration & Tracking Example");
    println!("==========================================\n");

    let mut session = InkSession::new(FusionConfig::default()).expect("default config is valid");
    let mut clock = FixedTime::new(0);

    // Step 1: pen touches anchor 1
    println!("Step 1: touch anchor 1");
    session.ingest(&frame_at(TRUE_ANCHORS[0], &clock, 0));
    session.calibrate_origin().expect("all ranges present");

    // Step 2: pen touches anchor 2
    clock.advance(1000);
    println!("Step 2: touch anchor 2\n");
    session.ingest(&frame_at(TRUE_ANCHORS[1], &clock, 0));
    let map = session.calibrate_width().expect("anchors form a triangle");

    println!("Resolved anchors (mm):");
    for anchor in map.anchors() {
        println!("  {:>5} -> ({:7.1}, {:7.1})", anchor.id, anchor.position.x, anchor.position.y);
    }
    let bounds = map.output_bounds();
    println!(
        "Scale: {:.3} units/mm, writable area {:.0} x {:.0} units\n",
        map.units_per_mm(),
        bounds.width(),
        bounds.height()
    );

    // Hover along a slow diagonal at 60 Hz
    println!("Tracking a hover path:");
    println!("{:>6} {:>16} {:>16} {:>8}", "tick", "truth (mm)", "cursor (mm)", "error");
    let start = Point2::new(100.0, 80.0);
    let end = Point2::new(160.0, 140.0);

    for tick in 0..=600u32 {
        clock.advance(16);
        let truth = start.lerp(end, tick as f32 / 600.0);
        session.ingest(&frame_at(truth, &clock, 0));

        let Ok(frame) = session.tick(clock.now()) else {
            continue;
        };

        if tick % 100 == 0 {
            let cursor = Point2::new(
                map.to_mm(frame.fusion.position.x),
                map.to_mm(frame.fusion.position.y),
            );
            println!(
                "{:>6} ({:6.1}, {:6.1}) ({:6.1}, {:6.1}) {:6.2}mm",
                tick,
                truth.x,
                truth.y,
                cursor.x,
                cursor.y,
                cursor.distance_to(truth)
            );
        }
    }

    println!("\nNote the lag while moving: hovering uses a stiff filter so");
    println!("the cursor does not shimmer over the page.");
}
