//! Overlap arrangement: subdivides the plane covered by the zones into
//! disjoint cells, each tagged with the number of zones covering it.
//!
//! The method is approximate. Zone hull boundaries are buffered outward by a
//! small tolerance so that boundaries of different zones always cross rather
//! than merely touch, the union of those boundaries is polygonized, the outer
//! silhouette face of every connected cluster is discarded, and the remaining
//! faces are shrunk back by the same tolerance.

mod graph;

#[cfg(test)]
mod tests_arrangement;

use std::time::Instant;

use geo::{ConvexHull, InteriorPoint, Intersects, Polygon};
use rstar::RTree;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::OverlapConfig;
use crate::error::{OverlapError, OverlapResult};
use crate::geometry::utils_2d::{
    self, ensure_ccw, offset_ring, point_in_polygon, point_in_polygon_with_holes, polygon_area, polygon_centroid,
    polygon_signed_area, simplify_ring, translate, EPSILON,
};
use crate::geometry::{bounds_tree, from_geo_ring, to_geo_polygon, Bounds2, IndexedBounds};
use crate::zone::{self, Zone};

/// Vertices of the noded boundary graph closer than this merge, in meters.
const SNAP_DISTANCE: f64 = 1e-6;

/// Face edges shorter than this are removed before shrinking, in meters.
const MIN_EDGE: f64 = 1e-3;

/// A disjoint region of the subdivision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Sequential index in discovery order.
    pub piece: usize,
    /// Number of buffered zone polygons covering the cell. Approximate;
    /// used only to select cells for exact resolution.
    pub layer: usize,
    /// Counter-clockwise open ring.
    pub exterior: Vec<[f64; 2]>,
    /// Clockwise open rings.
    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,
}

impl Cell {
    pub fn area(&self) -> f64 {
        polygon_area(&self.exterior) - self.holes.iter().map(|h| polygon_area(h)).sum::<f64>()
    }

    pub fn bounds(&self) -> Bounds2 {
        Bounds2::from_points(&self.exterior)
    }

    pub fn to_geo(&self) -> Polygon<f64> {
        to_geo_polygon(&self.exterior, &self.holes)
    }

    pub fn contains(&self, point: [f64; 2]) -> bool {
        utils_2d::point_in_polygon_with_holes(point, &self.exterior, &self.holes)
    }
}

/// Result of the arrangement stage. Serializable so a caller can persist it
/// and skip the stage on later runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrangement {
    pub circle_points: usize,
    pub tolerance: f64,
    pub zone_count: usize,
    /// `zone::fingerprint` of the zones the arrangement was built from.
    #[serde(default)]
    pub fingerprint: Uuid,
    /// Number of faces produced by polygonization.
    pub face_count: usize,
    /// Indices of the discarded silhouette faces.
    pub discarded: Vec<usize>,
    pub cells: Vec<Cell>,
}

impl Arrangement {
    fn empty(config: &OverlapConfig, zones: &[Zone]) -> Self {
        Self {
            circle_points: config.circle_points,
            tolerance: config.tolerance,
            zone_count: zones.len(),
            fingerprint: zone::fingerprint(zones),
            face_count: 0,
            discarded: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Cells covered by at least `min_layer` zones, in piece order.
    pub fn candidates(&self, min_layer: usize) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |c| c.layer >= min_layer)
    }

    /// Whether this arrangement was built from these exact zones with the
    /// same geometric settings.
    pub fn matches(&self, config: &OverlapConfig, zones: &[Zone]) -> bool {
        self.circle_points == config.circle_points
            && self.tolerance == config.tolerance
            && self.zone_count == zones.len()
            && self.fingerprint == zone::fingerprint(zones)
    }
}

/// A polygonized face, ordered for artifact detection.
#[derive(Debug, Clone)]
struct Face {
    exterior: Vec<[f64; 2]>,
    holes: Vec<Vec<[f64; 2]>>,
    /// Outer boundary of a connected cluster.
    silhouette: bool,
    bounds: Bounds2,
    polygon: Polygon<f64>,
}

impl Face {
    fn new(exterior: Vec<[f64; 2]>, holes: Vec<Vec<[f64; 2]>>, silhouette: bool) -> Self {
        Self {
            bounds: Bounds2::from_points(&exterior),
            polygon: to_geo_polygon(&exterior, &holes),
            exterior,
            holes,
            silhouette,
        }
    }

    fn disjoint(&self, other: &Face) -> bool {
        !self.bounds.intersects(&other.bounds) || !self.polygon.intersects(&other.polygon)
    }

    /// A point strictly inside the face, if one can be found.
    fn interior_point(&self) -> Option<[f64; 2]> {
        let inside = |p: [f64; 2]| point_in_polygon_with_holes(p, &self.exterior, &self.holes);
        if let Some(p) = self.polygon.interior_point() {
            let p = [p.x(), p.y()];
            if inside(p) {
                return Some(p);
            }
        }
        let centroid = polygon_centroid(&self.exterior);
        inside(centroid).then_some(centroid)
    }
}

/// Buffered zone rings indexed by their bounds.
///
/// Every ring is a union of face edges, so a face lies either wholly inside
/// or wholly outside each ring. Its layer is therefore the number of rings
/// around any one of its interior points.
struct LayerIndex<'a> {
    rings: &'a [Vec<[f64; 2]>],
    polygons: Vec<Polygon<f64>>,
    tree: RTree<IndexedBounds>,
}

impl<'a> LayerIndex<'a> {
    fn new(rings: &'a [Vec<[f64; 2]>]) -> Self {
        let bounds: Vec<Bounds2> = rings.iter().map(|r| Bounds2::from_points(r)).collect();
        Self {
            rings,
            polygons: rings.iter().map(|r| to_geo_polygon(r, &[])).collect(),
            tree: bounds_tree(&bounds),
        }
    }

    fn at_point(&self, p: [f64; 2]) -> usize {
        self.tree
            .locate_all_at_point(&p)
            .filter(|b| point_in_polygon(p, &self.rings[b.data]))
            .count()
    }

    /// Rings meeting a shrunk cell. Used only when a face has no usable
    /// interior point.
    fn touching(&self, cell: &Polygon<f64>, bounds: &Bounds2) -> usize {
        self.tree
            .locate_in_envelope_intersecting(&bounds.envelope())
            .filter(|b| self.polygons[b.data].intersects(cell))
            .count()
    }
}

pub struct ArrangementBuilder {
    config: OverlapConfig,
}

impl ArrangementBuilder {
    pub fn new(config: OverlapConfig) -> Self {
        Self { config }
    }

    /// Subdivide the zones into layered cells.
    ///
    /// Fewer than two zones cannot overlap and yield an empty arrangement.
    pub fn build(&self, zones: &[Zone]) -> OverlapResult<Arrangement> {
        if zones.len() < 2 {
            debug!("{} zone(s), nothing can overlap", zones.len());
            return Ok(Arrangement::empty(&self.config, zones));
        }

        let start = Instant::now();
        let tolerance = self.config.tolerance;

        // Work near the origin so crossings keep their precision
        let extent = zones.iter().fold(Bounds2::empty(), |b, z| b.merge(&z.bounds));
        let origin = extent.min;
        let to_local = [-origin[0], -origin[1]];

        // 1. Buffered hull boundaries
        let rings: Vec<Vec<[f64; 2]>> = zones
            .iter()
            .map(|z| {
                let local: Vec<[f64; 2]> = z.polygon.iter().map(|p| translate(*p, to_local)).collect();
                offset_ring(&convex_hull(&local), tolerance)
            })
            .collect();

        // 2. Polygonize, silhouettes first
        let faces = order_faces(graph::polygonize(&rings, SNAP_DISTANCE));
        debug!("Polygonized {} faces", faces.len());
        if faces.is_empty() {
            return Ok(Arrangement::empty(&self.config, zones));
        }

        // 3. Artifact removal
        let discarded = find_artifacts(&faces)?;

        // 4. Shrink surviving faces back and count the zones covering each
        let layers = LayerIndex::new(&rings);
        let to_global = |ring: &[[f64; 2]]| -> Vec<[f64; 2]> { ring.iter().map(|p| translate(*p, origin)).collect() };
        let mut cells: Vec<Cell> = Vec::new();
        for (idx, face) in faces.iter().enumerate() {
            if discarded.binary_search(&idx).is_ok() {
                continue;
            }

            let exterior = offset_ring(&simplify_ring(&face.exterior, MIN_EDGE), -tolerance);
            if polygon_signed_area(&exterior) <= EPSILON {
                debug!("Face {} collapsed when shrunk, dropping", idx);
                continue;
            }
            let holes: Vec<Vec<[f64; 2]>> = face
                .holes
                .iter()
                .map(|h| offset_ring(&simplify_ring(h, MIN_EDGE), -tolerance))
                .filter(|h| h.len() >= 3)
                .collect();

            let layer = match face.interior_point() {
                Some(p) => layers.at_point(p),
                None => {
                    warn!("No interior point for face {}, counting zones that touch it", idx);
                    layers.touching(&to_geo_polygon(&exterior, &holes), &Bounds2::from_points(&exterior))
                }
            };

            cells.push(Cell {
                piece: cells.len(),
                layer,
                exterior: to_global(&exterior),
                holes: holes.iter().map(|h| to_global(h)).collect(),
            });
        }

        info!(
            "Generated {} overlap cells from {} zones ({} faces, {} discarded) in {:.3}s",
            cells.len(),
            zones.len(),
            faces.len(),
            discarded.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(Arrangement {
            circle_points: self.config.circle_points,
            tolerance,
            zone_count: zones.len(),
            fingerprint: zone::fingerprint(zones),
            face_count: faces.len(),
            discarded,
            cells,
        })
    }
}

/// Counter-clockwise convex hull of an open ring.
fn convex_hull(ring: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let hull = to_geo_polygon(ring, &[]).convex_hull();
    let mut pts = from_geo_ring(hull.exterior());
    ensure_ccw(&mut pts);
    pts
}

/// Arrange graph faces by cluster: each cluster's silhouette followed by its
/// bounded faces, clusters by descending silhouette area. Index 0 is then the
/// largest face. A cluster lying inside a bounded face of another cluster
/// becomes a hole of that face.
fn order_faces(graph_faces: Vec<graph::GraphFace>) -> Vec<Face> {
    struct Cluster {
        silhouette: Option<(Vec<[f64; 2]>, f64)>,
        interiors: Vec<(Vec<[f64; 2]>, f64, Vec<Vec<[f64; 2]>>)>,
    }

    let cluster_count = graph_faces.iter().map(|f| f.component + 1).max().unwrap_or(0);
    let mut clusters: Vec<Cluster> = (0..cluster_count)
        .map(|_| Cluster { silhouette: None, interiors: Vec::new() })
        .collect();

    for face in graph_faces {
        let cluster = &mut clusters[face.component];
        if face.signed_area > EPSILON {
            match &cluster.silhouette {
                Some((_, area)) if *area >= face.signed_area => {
                    warn!("Cluster {} has more than one outer face", face.component);
                }
                _ => cluster.silhouette = Some((face.ring, face.signed_area)),
            }
        } else if face.signed_area < -EPSILON {
            let mut ring = face.ring;
            ring.reverse();
            cluster.interiors.push((ring, -face.signed_area, Vec::new()));
        }
    }

    clusters.retain(|c| c.silhouette.is_some() && !c.interiors.is_empty());

    // Nested clusters punch holes in the smallest enclosing face
    for c in 0..clusters.len() {
        let Some((silhouette, area)) = clusters[c].silhouette.clone() else {
            continue;
        };
        let sample = silhouette[0];

        let mut best: Option<(usize, usize, f64)> = None;
        for (d, other) in clusters.iter().enumerate() {
            if d == c {
                continue;
            }
            for (i, (ring, face_area, _)) in other.interiors.iter().enumerate() {
                if *face_area > area
                    && best.map_or(true, |(_, _, a)| *face_area < a)
                    && point_in_polygon(sample, ring)
                {
                    best = Some((d, i, *face_area));
                }
            }
        }

        if let Some((d, i, _)) = best {
            let mut hole = silhouette;
            hole.reverse();
            clusters[d].interiors[i].2.push(hole);
        }
    }

    let mut order: Vec<usize> = (0..clusters.len()).collect();
    let silhouette_area = |c: &Cluster| c.silhouette.as_ref().map_or(0.0, |(_, a)| *a);
    order.sort_by(|&a, &b| silhouette_area(&clusters[b]).total_cmp(&silhouette_area(&clusters[a])));

    let mut faces = Vec::new();
    for c in order {
        let cluster = &mut clusters[c];
        if let Some((ring, _)) = cluster.silhouette.take() {
            faces.push(Face::new(ring, Vec::new(), true));
        }
        for (ring, _, holes) in cluster.interiors.drain(..) {
            faces.push(Face::new(ring, holes, false));
        }
    }
    faces
}

/// Indices of artifact faces, ascending.
///
/// Index 0 is the first silhouette. From the highest artifact found so far,
/// the first later face disjoint from it is the next cluster's silhouette.
/// The scan stops once the highest artifact touches the last face, i.e. it
/// belongs to the last cluster.
fn find_artifacts(faces: &[Face]) -> OverlapResult<Vec<usize>> {
    let last = faces.len() - 1;
    if faces[last].silhouette {
        return Err(OverlapError::ArrangementInvariant(format!(
            "last of {} faces is a cluster silhouette, not a cell",
            faces.len()
        )));
    }

    let mut bad = vec![0];
    loop {
        let current = bad[bad.len() - 1];
        if !faces[current].disjoint(&faces[last]) {
            break;
        }
        match (current..faces.len()).find(|&i| faces[current].disjoint(&faces[i])) {
            Some(i) => bad.push(i),
            None => break,
        }
    }

    if bad.contains(&last) {
        return Err(OverlapError::ArrangementInvariant(
            "artifact scan discarded the last face".to_string(),
        ));
    }

    // Silhouettes of nested clusters touch their enclosing face and are
    // missed by the scan.
    let missed: Vec<usize> = faces
        .iter()
        .enumerate()
        .filter(|(i, f)| f.silhouette && !bad.contains(i))
        .map(|(i, _)| i)
        .collect();
    if !missed.is_empty() {
        warn!("Artifact scan missed {} nested cluster silhouette(s), discarding them too", missed.len());
        bad.extend(missed);
        bad.sort_unstable();
    }

    let stray = bad.iter().filter(|&&i| !faces[i].silhouette).count();
    if stray > 0 {
        warn!("Artifact scan discarded {} face(s) that are not silhouettes", stray);
    }

    Ok(bad)
}
