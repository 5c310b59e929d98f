//! Segment intersection used when noding zone boundaries.

use super::utils_2d::{distance_point_to_line, EPSILON};

/// How two segments meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// No common point.
    Disjoint,
    /// A single common point at parameter `t` on the first segment and `u` on
    /// the second.
    Point { point: [f64; 2], t: f64, u: f64 },
    /// The segments lie on one line and may share a stretch.
    Collinear,
}

/// Intersect segment `a0-a1` with segment `b0-b1`.
///
/// Uses the parametric form P = P0 + t*(P1-P0). Parallel segments are reported
/// as `Collinear` only when they lie on the same line within `EPSILON`.
pub fn segment_intersection(
    a0: [f64; 2], a1: [f64; 2],
    b0: [f64; 2], b1: [f64; 2],
) -> SegmentIntersection {
    let d1x = a1[0] - a0[0];
    let d1y = a1[1] - a0[1];
    let d2x = b1[0] - b0[0];
    let d2y = b1[1] - b0[1];

    let len1 = (d1x * d1x + d1y * d1y).sqrt();
    let len2 = (d2x * d2x + d2y * d2y).sqrt();
    if len1 < EPSILON || len2 < EPSILON {
        return SegmentIntersection::Disjoint;
    }

    // Cross product of direction vectors, scaled to a sine
    let cross = d1x * d2y - d1y * d2x;
    if (cross / (len1 * len2)).abs() < 1e-12 {
        if distance_point_to_line(a0, a1, b0) < EPSILON {
            return SegmentIntersection::Collinear;
        }
        return SegmentIntersection::Disjoint;
    }

    let dx = b0[0] - a0[0];
    let dy = b0[1] - a0[1];

    let t = (dx * d2y - dy * d2x) / cross;
    let u = (dx * d1y - dy * d1x) / cross;

    let tol_t = EPSILON / len1;
    let tol_u = EPSILON / len2;
    if t < -tol_t || t > 1.0 + tol_t || u < -tol_u || u > 1.0 + tol_u {
        return SegmentIntersection::Disjoint;
    }

    let t = t.clamp(0.0, 1.0);
    let u = u.clamp(0.0, 1.0);
    SegmentIntersection::Point {
        point: [a0[0] + t * d1x, a0[1] + t * d1y],
        t,
        u,
    }
}

/// Find the parameter t along segment where a point lies.
/// Returns t such that point = start + t * (end - start).
pub fn point_on_line_parameter(start: [f64; 2], end: [f64; 2], point: [f64; 2]) -> f64 {
    let dx = end[0] - start[0];
    let dy = end[1] - start[1];
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-15 {
        return 0.0;
    }

    let px = point[0] - start[0];
    let py = point[1] - start[1];

    (px * dx + py * dy) / len_sq
}

/// Endpoints of `other` that fall strictly inside segment `start-end`, with
/// their parameters. Used to split collinear, overlapping segments.
pub fn collinear_splits(
    start: [f64; 2], end: [f64; 2],
    other: [[f64; 2]; 2],
) -> Vec<(f64, [f64; 2])> {
    other
        .iter()
        .filter_map(|&p| {
            let t = point_on_line_parameter(start, end, p);
            (t > 0.0 && t < 1.0).then_some((t, p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_crossing() {
        // X from (0,0)-(10,10) and (0,10)-(10,0)
        match segment_intersection([0.0, 0.0], [10.0, 10.0], [0.0, 10.0], [10.0, 0.0]) {
            SegmentIntersection::Point { point, t, u } => {
                assert!((point[0] - 5.0).abs() < 1e-9);
                assert!((point[1] - 5.0).abs() < 1e-9);
                assert!((t - 0.5).abs() < 1e-9);
                assert!((u - 0.5).abs() < 1e-9);
            }
            other => panic!("Expected crossing, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_segments() {
        let r = segment_intersection([0.0, 0.0], [10.0, 0.0], [0.0, 5.0], [10.0, 5.0]);
        assert_eq!(r, SegmentIntersection::Disjoint);
    }

    #[test]
    fn test_collinear_segments() {
        let r = segment_intersection([0.0, 0.0], [10.0, 0.0], [5.0, 0.0], [15.0, 0.0]);
        assert_eq!(r, SegmentIntersection::Collinear);

        let splits = collinear_splits([0.0, 0.0], [10.0, 0.0], [[5.0, 0.0], [15.0, 0.0]]);
        assert_eq!(splits.len(), 1);
        assert!((splits[0].0 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_intersection_outside_segment() {
        // Lines would intersect if extended, but not within segments
        let r = segment_intersection([0.0, 0.0], [5.0, 0.0], [10.0, 5.0], [10.0, -5.0]);
        assert_eq!(r, SegmentIntersection::Disjoint);
    }

    #[test]
    fn test_shared_endpoint() {
        match segment_intersection([0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 1.0]) {
            SegmentIntersection::Point { point, t, u } => {
                assert!((point[0] - 1.0).abs() < 1e-12);
                assert!((t - 1.0).abs() < 1e-12);
                assert!(u.abs() < 1e-12);
            }
            other => panic!("Expected touching point, got {:?}", other),
        }
    }

    #[test]
    fn test_point_on_line_parameter() {
        let t = point_on_line_parameter([0.0, 0.0], [10.0, 0.0], [5.0, 0.0]);
        assert!((t - 0.5).abs() < 1e-6);

        let t2 = point_on_line_parameter([0.0, 0.0], [10.0, 0.0], [15.0, 0.0]);
        assert!((t2 - 1.5).abs() < 1e-6);
    }
}
