//! Planar geometry shared by the zone, arrangement and resolution stages.
//!
//! Points are plain `[f64; 2]` pairs in projected meters. Conversions to `geo`
//! types happen only where a `geo` predicate is needed.

use geo::{Coord, LineString, Polygon};

pub mod primitives;
pub use primitives::{bounds_tree, Bounds2, IndexedBounds};

pub mod intersection;
pub use intersection::*;

pub mod utils_2d;

pub use utils_2d::EPSILON;

/// Build a `geo` polygon from an open exterior ring and open hole rings.
pub fn to_geo_polygon(exterior: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> Polygon<f64> {
    let ring = |pts: &[[f64; 2]]| -> LineString<f64> {
        pts.iter().map(|p| Coord { x: p[0], y: p[1] }).collect()
    };
    Polygon::new(ring(exterior), holes.iter().map(|h| ring(h)).collect())
}

/// Open ring (no repeated closing point) from a `geo` line string.
pub fn from_geo_ring(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    let mut pts: Vec<[f64; 2]> = ring.coords().map(|c| [c.x, c.y]).collect();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}
