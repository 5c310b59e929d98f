//! 2D geometry utilities for zone and cell polygons.
//!
//! Rings are open: the closing point is implied, never repeated.

use std::f64::consts::PI;

/// Tolerance for floating-point comparisons, in projected meters.
pub const EPSILON: f64 = 1e-6;

/// Longest allowed miter, as a multiple of the offset distance.
const MITER_LIMIT: f64 = 4.0;

// =============================================================================
// Point Operations
// =============================================================================

/// Compute squared distance between two 2D points.
#[inline]
pub fn distance_squared(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    let dx = p2[0] - p1[0];
    let dy = p2[1] - p1[1];
    dx * dx + dy * dy
}

/// Compute distance between two 2D points.
#[inline]
pub fn distance(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    distance_squared(p1, p2).sqrt()
}

#[inline]
pub fn translate(p: [f64; 2], by: [f64; 2]) -> [f64; 2] {
    [p[0] + by[0], p[1] + by[1]]
}

// =============================================================================
// Vector Operations
// =============================================================================

/// 2D dot product.
#[inline]
pub fn dot_2d(v1: [f64; 2], v2: [f64; 2]) -> f64 {
    v1[0] * v2[0] + v1[1] * v2[1]
}

/// Normalize a 2D vector. Returns [0, 0] if vector is zero.
#[inline]
pub fn normalize_2d(v: [f64; 2]) -> [f64; 2] {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    if len < EPSILON {
        [0.0, 0.0]
    } else {
        [v[0] / len, v[1] / len]
    }
}

/// Compute perpendicular distance from point to infinite line.
pub fn distance_point_to_line(line_start: [f64; 2], line_end: [f64; 2], point: [f64; 2]) -> f64 {
    let dx = line_end[0] - line_start[0];
    let dy = line_end[1] - line_start[1];
    let len = (dx * dx + dy * dy).sqrt();

    if len < EPSILON {
        return distance(line_start, point);
    }

    let px = point[0] - line_start[0];
    let py = point[1] - line_start[1];
    ((px * dy - py * dx) / len).abs()
}

// =============================================================================
// Polygon Operations
// =============================================================================

/// Compute signed area of a polygon using the Shoelace formula.
/// Positive = CCW winding, Negative = CW winding.
pub fn polygon_signed_area(vertices: &[[f64; 2]]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i][0] * vertices[j][1];
        area -= vertices[j][0] * vertices[i][1];
    }
    area / 2.0
}

/// Compute absolute area of a polygon.
pub fn polygon_area(vertices: &[[f64; 2]]) -> f64 {
    polygon_signed_area(vertices).abs()
}

/// Compute centroid of a polygon.
pub fn polygon_centroid(vertices: &[[f64; 2]]) -> [f64; 2] {
    let n = vertices.len();
    if n == 0 {
        return [0.0, 0.0];
    }

    let mut signed_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;

    for i in 0..n {
        let j = (i + 1) % n;
        let cross = vertices[i][0] * vertices[j][1] - vertices[j][0] * vertices[i][1];
        signed_area += cross;
        cx += (vertices[i][0] + vertices[j][0]) * cross;
        cy += (vertices[i][1] + vertices[j][1]) * cross;
    }

    signed_area /= 2.0;

    if signed_area.abs() > EPSILON {
        cx /= 6.0 * signed_area;
        cy /= 6.0 * signed_area;
    } else {
        // Degenerate polygon: use average
        cx = vertices.iter().map(|p| p[0]).sum::<f64>() / n as f64;
        cy = vertices.iter().map(|p| p[1]).sum::<f64>() / n as f64;
    }

    [cx, cy]
}

/// Test if a point is inside a polygon using the winding number algorithm.
/// Works for both convex and concave polygons.
pub fn point_in_polygon(point: [f64; 2], polygon: &[[f64; 2]]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut winding: i32 = 0;

    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];

        if p1[1] <= point[1] {
            if p2[1] > point[1] {
                // Upward crossing
                let cross = (p2[0] - p1[0]) * (point[1] - p1[1]) - (p2[1] - p1[1]) * (point[0] - p1[0]);
                if cross > 0.0 {
                    winding += 1;
                }
            }
        } else if p2[1] <= point[1] {
            // Downward crossing
            let cross = (p2[0] - p1[0]) * (point[1] - p1[1]) - (p2[1] - p1[1]) * (point[0] - p1[0]);
            if cross < 0.0 {
                winding -= 1;
            }
        }
    }

    winding != 0
}

/// Point inside `exterior` and outside every hole.
pub fn point_in_polygon_with_holes(point: [f64; 2], exterior: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> bool {
    point_in_polygon(point, exterior) && !holes.iter().any(|h| point_in_polygon(point, h))
}

/// Reverse the ring in place if it is clockwise.
pub fn ensure_ccw(ring: &mut [[f64; 2]]) {
    if polygon_signed_area(ring) < 0.0 {
        ring.reverse();
    }
}

// =============================================================================
// Circle and Offset Utilities
// =============================================================================

/// Compute a point on a circle given center, radius, and angle (radians).
#[inline]
pub fn arc_point(center: [f64; 2], radius: f64, angle: f64) -> [f64; 2] {
    [
        center[0] + radius * angle.cos(),
        center[1] + radius * angle.sin(),
    ]
}

/// Regular `segments`-gon inscribed in the circle, counter-clockwise, starting
/// at angle zero. Callers validate `segments >= 3`.
pub fn regular_polygon(center: [f64; 2], radius: f64, segments: usize) -> Vec<[f64; 2]> {
    (0..segments)
        .map(|i| {
            let angle = (i as f64 / segments as f64) * 2.0 * PI;
            arc_point(center, radius, angle)
        })
        .collect()
}

/// Drop vertices closer than `min_edge` to the previously kept vertex,
/// including across the closing edge.
pub fn simplify_ring(ring: &[[f64; 2]], min_edge: f64) -> Vec<[f64; 2]> {
    let min_sq = min_edge * min_edge;
    let mut kept: Vec<[f64; 2]> = Vec::with_capacity(ring.len());
    for &p in ring {
        if kept.last().map_or(true, |&q| distance_squared(p, q) >= min_sq) {
            kept.push(p);
        }
    }
    while kept.len() > 1 && distance_squared(kept[0], kept[kept.len() - 1]) < min_sq {
        kept.pop();
    }
    kept
}

/// Offset every edge of a ring along its right-hand normal by `distance`,
/// joining edges with capped miters.
///
/// For a counter-clockwise ring a positive distance grows the enclosed area
/// and a negative one shrinks it. For a clockwise ring (a hole) the effect is
/// reversed, so the same call with a negative distance also shrinks the
/// material around a hole.
pub fn offset_ring(ring: &[[f64; 2]], distance: f64) -> Vec<[f64; 2]> {
    let n = ring.len();
    if n < 3 || distance == 0.0 {
        return ring.to_vec();
    }

    let normal = |a: [f64; 2], b: [f64; 2]| -> [f64; 2] {
        normalize_2d([b[1] - a[1], -(b[0] - a[0])])
    };

    let min_denom = 2.0 / (MITER_LIMIT * MITER_LIMIT);

    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let curr = ring[i];
            let next = ring[(i + 1) % n];

            let n1 = normal(prev, curr);
            let n2 = normal(curr, next);
            let denom = (1.0 + dot_2d(n1, n2)).max(min_denom);
            let miter = [(n1[0] + n2[0]) / denom, (n1[1] + n2[1]) / denom];

            [curr[0] + distance * miter[0], curr[1] + distance * miter[1]]
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
