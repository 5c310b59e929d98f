//! Final ordering and back-projection of resolved overlaps.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::projection::{CoordinateProjector, GeoPoint};
use crate::resolve::{Contributor, OverlapRecord};

/// A resolved overlap in geographic coordinates, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOverlap {
    /// Stable across runs for the same piece and contributors.
    pub id: Uuid,
    pub piece: usize,
    pub layer: usize,
    pub point: GeoPoint,
    /// Closed ring: the first point is repeated last.
    pub boundary: Vec<GeoPoint>,
    pub contributors: Vec<Contributor>,
}

impl ResolvedOverlap {
    /// Number of contributing entities, the N of the N-fer.
    pub fn count(&self) -> usize {
        self.contributors.len()
    }

    pub fn label(&self) -> String {
        format!("{}-fer", self.count())
    }
}

/// Deterministic id for an overlap record.
pub fn overlap_id(piece: usize, contributors: &[Contributor]) -> Uuid {
    let refs: Vec<&str> = contributors.iter().map(|c| c.reference.as_str()).collect();
    let name = format!("overlap:{}:{}", piece, refs.join("|"));
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

pub struct ResultAssembler<'a, P: CoordinateProjector + ?Sized> {
    projector: &'a P,
}

impl<'a, P: CoordinateProjector + ?Sized> ResultAssembler<'a, P> {
    pub fn new(projector: &'a P) -> Self {
        Self { projector }
    }

    /// Project every record and order by descending contributor count. Ties
    /// keep their resolution order.
    pub fn assemble(&self, records: Vec<OverlapRecord>) -> Vec<ResolvedOverlap> {
        let mut results: Vec<ResolvedOverlap> = records.into_iter().map(|r| self.project(r)).collect();
        results.sort_by(|a, b| b.count().cmp(&a.count()));
        results
    }

    fn project(&self, record: OverlapRecord) -> ResolvedOverlap {
        let to_geo = |p: &[f64; 2]| self.projector.to_geographic(p[0], p[1]);

        let mut boundary: Vec<GeoPoint> = record.exterior.iter().map(to_geo).collect();
        if let Some(&first) = boundary.first() {
            if boundary.last() != Some(&first) {
                boundary.push(first);
            }
        }

        ResolvedOverlap {
            id: overlap_id(record.piece, &record.contributors),
            piece: record.piece,
            layer: record.layer,
            point: to_geo(&record.point),
            boundary,
            contributors: record.contributors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::IdentityProjector;

    fn contributor(reference: &str) -> Contributor {
        Contributor {
            name: format!("Site {}", reference),
            reference: reference.to_string(),
        }
    }

    fn record(piece: usize, refs: &[&str]) -> OverlapRecord {
        OverlapRecord {
            piece,
            layer: refs.len(),
            point: [0.5, 0.5],
            exterior: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            contributors: refs.iter().map(|r| contributor(r)).collect(),
        }
    }

    #[test]
    fn test_sorted_by_count_stable_on_ties() {
        let records = vec![
            record(0, &["A", "B"]),
            record(1, &["A", "B", "C"]),
            record(2, &["B", "C"]),
            record(3, &["A", "C"]),
            record(4, &["A", "B", "C", "D"]),
        ];
        let results = ResultAssembler::new(&IdentityProjector).assemble(records);
        let pieces: Vec<usize> = results.iter().map(|r| r.piece).collect();
        assert_eq!(pieces, vec![4, 1, 0, 2, 3]);
        assert_eq!(results[0].label(), "4-fer");
    }

    #[test]
    fn test_boundary_is_closed() {
        let results = ResultAssembler::new(&IdentityProjector).assemble(vec![record(0, &["A", "B"])]);
        let boundary = &results[0].boundary;
        assert_eq!(boundary.len(), 5);
        assert_eq!(boundary.first(), boundary.last());
        // Identity maps (x, y) to (lat = y, lon = x)
        assert_eq!(boundary[1], GeoPoint::new(0.0, 1.0));
        assert_eq!(results[0].point, GeoPoint::new(0.5, 0.5));
    }

    #[test]
    fn test_ids_are_deterministic() {
        let a = overlap_id(3, &[contributor("A"), contributor("B")]);
        let b = overlap_id(3, &[contributor("A"), contributor("B")]);
        let c = overlap_id(4, &[contributor("A"), contributor("B")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.get_version_num(), 5);
    }

    #[test]
    fn test_empty_input() {
        assert!(ResultAssembler::new(&IdentityProjector).assemble(vec![]).is_empty());
    }
}
