use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use serde::{Deserialize, Serialize};

/// A bounding box tagged with the index of the item it bounds.
pub type IndexedBounds = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Axis-aligned bounding box in the projected plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Bounds2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    pub fn from_points(points: &[[f64; 2]]) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.extend(*p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    pub fn extend(&mut self, p: [f64; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn merge(&self, other: &Bounds2) -> Bounds2 {
        Bounds2 {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Bounds2 {
        Bounds2 {
            min: [self.min[0] - margin, self.min[1] - margin],
            max: [self.max[0] + margin, self.max[1] + margin],
        }
    }

    /// Closed-interval overlap test; touching boxes intersect.
    pub fn intersects(&self, other: &Bounds2) -> bool {
        self.min[0] <= other.max[0]
            && other.min[0] <= self.max[0]
            && self.min[1] <= other.max[1]
            && other.min[1] <= self.max[1]
    }

    pub fn contains(&self, p: [f64; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max[0] - self.min[0]) * (self.max[1] - self.min[1])
        }
    }

    pub fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners(self.min, self.max)
    }

    pub fn indexed(&self, index: usize) -> IndexedBounds {
        GeomWithData::new(Rectangle::from_corners(self.min, self.max), index)
    }
}

/// Bulk-load boxes into an R-tree, each tagged with its position in `bounds`.
pub fn bounds_tree(bounds: &[Bounds2]) -> RTree<IndexedBounds> {
    RTree::bulk_load(bounds.iter().enumerate().map(|(i, b)| b.indexed(i)).collect())
}
