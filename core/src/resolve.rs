//! Exact resolution of candidate cells.
//!
//! The arrangement's layer counts come from buffered polygons and are only
//! approximate. Each candidate cell is resolved by sampling one point inside
//! it and testing that point against the true circles.

use std::time::Instant;

use geo::InteriorPoint;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::arrangement::{Arrangement, Cell};
use crate::geometry::utils_2d::polygon_centroid;
use crate::zone::{display_label, Zone};

/// An entity whose zone covers an overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Contributor {
    pub fn from_zone(zone: &Zone) -> Self {
        Self {
            name: zone.name.clone(),
            reference: zone.reference.clone(),
        }
    }

    pub fn label(&self) -> String {
        display_label(&self.reference, &self.name)
    }
}

/// A candidate cell with its exact contributors, still in planar coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapRecord {
    pub piece: usize,
    pub layer: usize,
    pub point: [f64; 2],
    /// Open exterior ring of the cell.
    pub exterior: Vec<[f64; 2]>,
    /// In entity input order.
    pub contributors: Vec<Contributor>,
}

pub struct OverlapResolver {
    min_layer: usize,
}

impl OverlapResolver {
    pub fn new(min_layer: usize) -> Self {
        Self { min_layer }
    }

    /// Resolve every cell whose layer meets the threshold, in piece order.
    pub fn resolve(&self, arrangement: &Arrangement, zones: &[Zone]) -> Vec<OverlapRecord> {
        let start = Instant::now();
        let mut skipped = 0;

        let records: Vec<OverlapRecord> = arrangement
            .candidates(self.min_layer)
            .filter_map(|cell| {
                let record = self.resolve_cell(cell, zones);
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();

        info!(
            "Resolved {} of {} cells at layer >= {} ({} skipped) in {:.3}s",
            records.len(),
            arrangement.cells.len(),
            self.min_layer,
            skipped,
            start.elapsed().as_secs_f64()
        );
        records
    }

    fn resolve_cell(&self, cell: &Cell, zones: &[Zone]) -> Option<OverlapRecord> {
        let Some(point) = representative_point(cell) else {
            warn!("No interior point for piece {}, skipping", cell.piece);
            return None;
        };

        Some(OverlapRecord {
            piece: cell.piece,
            layer: cell.layer,
            point,
            exterior: cell.exterior.clone(),
            contributors: contributors_at(point, zones),
        })
    }
}

/// A point strictly inside the cell, or `None` for a degenerate cell.
///
/// The centroid is only used when the interior point search fails, and only
/// if it actually lies inside; a non-convex cell can have its centroid in a
/// neighbouring cell.
pub fn representative_point(cell: &Cell) -> Option<[f64; 2]> {
    if let Some(p) = cell.to_geo().interior_point() {
        let p = [p.x(), p.y()];
        if cell.contains(p) {
            return Some(p);
        }
    }

    let centroid = polygon_centroid(&cell.exterior);
    cell.contains(centroid).then_some(centroid)
}

/// Zones whose true circle contains `point`, in entity order.
pub fn contributors_at(point: [f64; 2], zones: &[Zone]) -> Vec<Contributor> {
    let mut hits: Vec<&Zone> = zones.iter().filter(|z| z.contains(point)).collect();
    hits.sort_by_key(|z| z.entity);
    hits.into_iter().map(Contributor::from_zone).collect()
}
