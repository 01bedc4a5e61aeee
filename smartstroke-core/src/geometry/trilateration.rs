//! Closed-form 2D trilateration from three anchor ranges
//!
//! ## Algorithm
//!
//! Each range defines a circle `(x − xᵢ)² + (y − yᵢ)² = dᵢ²`. Subtracting the
//! circle equations pairwise (1−2, 2−3) cancels the quadratic terms and leaves
//! two linear equations:
//!
//! ```text
//! A·x + B·y = C      A = 2(x2−x1)  B = 2(y2−y1)  C = d1²−d2²−x1²+x2²−y1²+y2²
//! D·x + E·y = F      D = 2(x3−x2)  E = 2(y3−y2)  F = d2²−d3²−x2²+x3²−y2²+y3²
//!
//! denom = E·A − B·D
//! x = (C·E − F·B) / denom
//! y = (C·D − A·F) / (B·D − A·E)
//! ```
//!
//! With exactly three anchors the solve is exact; there is no least-squares
//! averaging over redundant ranges.
//!
//! ## Failure Modes
//!
//! - A range that is NaN, infinite or negative counts as missing
//! - `|denom| < 1e-6` means the anchors are (nearly) collinear
//! - A non-finite result is discarded rather than handed to the filters

use crate::{
    constants::tuning::TRILATERATION_EPSILON,
    errors::{FusionError, FusionResult},
    geometry::{Anchor, Point2},
};

/// Solve for the point whose distances to `anchors` are `distances` (mm)
///
/// `distances[n]` must belong to `anchors[n]`.
pub fn solve(distances: [f32; 3], anchors: &[Anchor; 3]) -> FusionResult<Point2> {
    for (distance, anchor) in distances.iter().zip(anchors.iter()) {
        if !distance.is_finite() || *distance < 0.0 {
            return Err(FusionError::MissingMeasurement { anchor: anchor.id });
        }
    }

    let [d1, d2, d3] = distances;
    let (x1, y1) = (anchors[0].position.x, anchors[0].position.y);
    let (x2, y2) = (anchors[1].position.x, anchors[1].position.y);
    let (x3, y3) = (anchors[2].position.x, anchors[2].position.y);

    let a = 2.0 * (x2 - x1);
    let b = 2.0 * (y2 - y1);
    let c = d1 * d1 - d2 * d2 - x1 * x1 + x2 * x2 - y1 * y1 + y2 * y2;
    let d = 2.0 * (x3 - x2);
    let e = 2.0 * (y3 - y2);
    let f = d2 * d2 - d3 * d3 - x2 * x2 + x3 * x3 - y2 * y2 + y3 * y3;

    let denom = e * a - b * d;
    if libm::fabsf(denom) < TRILATERATION_EPSILON {
        return Err(FusionError::DegenerateGeometry { reason: "collinear anchors" });
    }

    let point = Point2::new(
        (c * e - f * b) / denom,
        (c * d - a * f) / (b * d - a * e),
    );

    if !(point.x.is_finite() && point.y.is_finite()) {
        return Err(FusionError::DegenerateGeometry { reason: "non-finite solution" });
    }

    Ok(point)
}

/// Convenience form of [`solve`] that discards the failure reason
pub fn trilaterate(distances: [f32; 3], anchors: &[Anchor; 3]) -> Option<Point2> {
    solve(distances, anchors).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AnchorId;

    fn anchors(points: [(f32, f32); 3]) -> [Anchor; 3] {
        [
            Anchor::new(AnchorId(1), Point2::new(points[0].0, points[0].1)),
            Anchor::new(AnchorId(2), Point2::new(points[1].0, points[1].1)),
            Anchor::new(AnchorId(3), Point2::new(points[2].0, points[2].1)),
        ]
    }

    fn ranges_to(point: Point2, anchors: &[Anchor; 3]) -> [f32; 3] {
        [
            point.distance_to(anchors[0].position),
            point.distance_to(anchors[1].position),
            point.distance_to(anchors[2].position),
        ]
    }

    #[test]
    fn recovers_point_inside_triangle() {
        let map = anchors([(0.0, 0.0), (600.0, 0.0), (250.0, 400.0)]);
        let truth = Point2::new(310.0, 120.0);

        let solved = trilaterate(ranges_to(truth, &map), &map).unwrap();
        assert!(solved.distance_to(truth) < 0.05);
    }

    #[test]
    fn recovers_point_outside_triangle() {
        let map = anchors([(0.0, 0.0), (500.0, 0.0), (0.0, 350.0)]);
        let truth = Point2::new(-40.0, 420.0);

        let solved = trilaterate(ranges_to(truth, &map), &map).unwrap();
        assert!(solved.distance_to(truth) < 0.05);
    }

    #[test]
    fn collinear_anchors_fail_cleanly() {
        let map = anchors([(0.0, 0.0), (100.0, 0.0), (300.0, 0.0)]);
        assert_eq!(
            solve([50.0, 60.0, 250.0], &map),
            Err(FusionError::DegenerateGeometry { reason: "collinear anchors" })
        );
    }

    #[test]
    fn missing_range_names_the_anchor() {
        let map = anchors([(0.0, 0.0), (500.0, 0.0), (0.0, 350.0)]);
        assert_eq!(
            solve([100.0, f32::NAN, 200.0], &map),
            Err(FusionError::MissingMeasurement { anchor: AnchorId(2) })
        );
        assert_eq!(
            solve([100.0, 120.0, -1.0], &map),
            Err(FusionError::MissingMeasurement { anchor: AnchorId(3) })
        );
    }
}
