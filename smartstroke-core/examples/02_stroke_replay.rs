//! Stroke Capture Example
//!
//! Writes a short zig-zag with pressure, lifts, turns the page, and then
//! replays the notebook as render commands.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_stroke_replay
//! ```

use smartstroke_core::{
    constants::hardware::{ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID},
    CurveSegment, FusionConfig, InkSession, Point2, Quaternion, StrokeColor, TelemetryFrame,
};

const ANCHORS: [Point2; 3] = [
    Point2::new(0.0, 0.0),
    Point2::new(600.0, 0.0),
    Point2::new(0.0, 400.0),
];

fn frame(pen: Point2, ts: u64, pressure: u16, next_page: bool) -> TelemetryFrame {
    let ids = [ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID];
    let mut frame = TelemetryFrame::new(ts)
        .with_pressure(pressure)
        .with_orientation(Quaternion::IDENTITY)
        .with_next_page(next_page);
    for (id, anchor) in ids.iter().zip(ANCHORS.iter()) {
        frame = frame.with_link(*id, pen.distance_to(*anchor) / 1000.0);
    }
    frame
}

fn describe(segment: &CurveSegment) -> String {
    match segment {
        CurveSegment::Line { from, to, width } => format!(
            "line  ({:6.1},{:6.1}) -> ({:6.1},{:6.1}) w={:.2}",
            from.x, from.y, to.x, to.y, width
        ),
        CurveSegment::Quadratic { from, control, to, width } => format!(
            "quad  ({:6.1},{:6.1}) ~({:6.1},{:6.1}) -> ({:6.1},{:6.1}) w={:.2}",
            from.x, from.y, control.x, control.y, to.x, to.y, width
        ),
    }
}

fn main() {
    println!("SmartStroke Stroke Capture Example");
    println!("==================================\n");

    let mut session = InkSession::new(FusionConfig::default()).expect("default config is valid");
    session.ingest(&frame(ANCHORS[0], 0, 0, false));
    session.calibrate_origin().expect("ranges present");
    session.ingest(&frame(ANCHORS[1], 1, 0, false));
    session.calibrate_width().expect("valid triangle");

    let mut ts = 10;
    let mut step = |session: &mut InkSession, at: Point2, pressure: u16, next_page: bool| {
        session.ingest(&frame(at, ts, pressure, next_page));
        let out = session.tick(ts);
        ts += 1;
        out
    };

    // Settle over the start point
    for _ in 0..60 {
        let _ = step(&mut session, Point2::new(200.0, 200.0), 0, false);
    }

    // Zig-zag with rising pressure
    session.set_color(StrokeColor::RED);
    println!("Live segments:");
    for i in 0..12 {
        let at = Point2::new(200.0 + 5.0 * i as f32, if i % 2 == 0 { 200.0 } else { 210.0 });
        let pressure = 400 + 300 * i as u16;
        if let Ok(frame) = step(&mut session, at, pressure, false) {
            if let Some(segment) = frame.segment {
                println!("  {}", describe(&segment));
            }
        }
    }

    // Lift, then press the page button
    if let Ok(frame) = step(&mut session, Point2::new(260.0, 205.0), 0, false) {
        if let Some(stroke) = frame.sealed {
            println!("\nSealed a {} stroke with {} points", stroke.color(), stroke.len());
        }
    }
    if let Ok(frame) = step(&mut session, Point2::new(260.0, 205.0), 0, true) {
        println!("Now writing on page {}", frame.page);
    }

    println!("\nReplay of page 0:");
    if let Some(page) = session.notebook().page(0) {
        for stroke in page.strokes() {
            for segment in stroke.segments() {
                println!("  {}", describe(&segment));
            }
        }
    }
}
