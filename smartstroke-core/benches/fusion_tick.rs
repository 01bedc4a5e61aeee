use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smartstroke_core::{
    constants::hardware::{ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID},
    geometry::trilaterate,
    Anchor, FusionConfig, InkSession, Point2, Quaternion, TelemetryFrame,
};

const ANCHORS: [Point2; 3] = [
    Point2::new(0.0, 0.0),
    Point2::new(600.0, 0.0),
    Point2::new(0.0, 400.0),
];

fn frame(at: Point2, ts: u64, pressure: u16) -> TelemetryFrame {
    let ids = [ANCHOR_1_ID, ANCHOR_2_ID, ANCHOR_3_ID];
    ids.iter().zip(ANCHORS.iter()).fold(
        TelemetryFrame::new(ts)
            .with_pressure(pressure)
            .with_orientation(Quaternion::from_yaw(0.01 * (ts % 7) as f32)),
        |frame, (id, anchor)| frame.with_link(*id, at.distance_to(*anchor) / 1000.0),
    )
}

fn calibrated() -> InkSession {
    let mut session = InkSession::new(FusionConfig::default()).unwrap();
    session.ingest(&frame(ANCHORS[0], 0, 0));
    session.calibrate_origin().unwrap();
    session.ingest(&frame(ANCHORS[1], 1, 0));
    session.calibrate_width().unwrap();
    session
}

fn bench_trilaterate(c: &mut Criterion) {
    let anchors = [
        Anchor::new(ANCHOR_1_ID, ANCHORS[0]),
        Anchor::new(ANCHOR_2_ID, ANCHORS[1]),
        Anchor::new(ANCHOR_3_ID, ANCHORS[2]),
    ];
    let truth = Point2::new(310.0, 120.0);
    let ranges = [
        truth.distance_to(ANCHORS[0]),
        truth.distance_to(ANCHORS[1]),
        truth.distance_to(ANCHORS[2]),
    ];

    c.bench_function("trilaterate", |b| {
        b.iter(|| trilaterate(black_box(ranges), black_box(&anchors)))
    });
}

fn bench_session_tick(c: &mut Criterion) {
    c.bench_function("session_tick_hover", |b| {
        let mut session = calibrated();
        let mut ts = 10;
        b.iter(|| {
            session.ingest(&frame(Point2::new(300.0, 200.0), ts, 0));
            let out = session.tick(ts);
            ts += 1;
            black_box(out)
        })
    });

    c.bench_function("session_tick_writing", |b| {
        let mut session = calibrated();
        let mut ts = 10;
        b.iter(|| {
            let x = 100.0 + (ts % 400) as f32;
            // Lift every 400 ticks so the stroke buffer stays bounded
            let pressure = if ts % 400 == 0 { 0 } else { 1500 };
            session.ingest(&frame(Point2::new(x, 200.0), ts, pressure));
            let out = session.tick(ts);
            ts += 1;
            black_box(out)
        })
    });
}

criterion_group!(benches, bench_trilaterate, bench_session_tick);
criterion_main!(benches);
