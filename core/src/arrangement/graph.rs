//! Face extraction for a set of closed boundary rings.
//!
//! Polygonizes the union of the rings by:
//! 1. Splitting every segment at its crossings with segments of other rings
//! 2. Building a planar graph with vertices at ring vertices and crossings
//! 3. Traversing half-edges to find every face, including each connected
//!    cluster's outer boundary

use std::collections::{HashMap, HashSet};

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::geometry::utils_2d::polygon_signed_area;
use crate::geometry::{bounds_tree, collinear_splits, segment_intersection, Bounds2, IndexedBounds, SegmentIntersection};

/// A face of the noded boundary graph, in traversal order.
///
/// Bounded faces are traversed clockwise (negative area). The outer face of
/// each connected cluster is traversed counter-clockwise (positive area) and
/// traces the cluster's silhouette.
#[derive(Debug, Clone)]
pub(crate) struct GraphFace {
    pub ring: Vec<[f64; 2]>,
    pub signed_area: f64,
    /// Connected cluster, numbered in order of first appearance.
    pub component: usize,
}

/// A vertex in the planar graph
#[derive(Debug, Clone)]
struct GraphVertex {
    pos: [f64; 2],
    /// Outgoing half-edges
    edges: Vec<usize>,
}

/// A half-edge in the planar graph
#[derive(Debug, Clone)]
struct HalfEdge {
    start: usize,
    end: usize,
    twin: usize,
    /// Next half-edge in face traversal
    next: Option<usize>,
    /// Has this edge been used in face extraction?
    used: bool,
}

/// Merges vertices closer than `snap`. A new position joins the
/// lowest-numbered vertex within reach.
struct VertexIndex {
    snap_sq: f64,
    tree: RTree<GeomWithData<[f64; 2], usize>>,
}

impl VertexIndex {
    fn new(snap: f64) -> Self {
        Self { snap_sq: snap * snap, tree: RTree::new() }
    }

    fn get_or_insert(&mut self, pos: [f64; 2], vertices: &mut Vec<GraphVertex>) -> usize {
        if let Some(idx) = self.tree.locate_within_distance(pos, self.snap_sq).map(|v| v.data).min() {
            return idx;
        }

        let idx = vertices.len();
        vertices.push(GraphVertex { pos, edges: Vec::new() });
        self.tree.insert(GeomWithData::new(pos, idx));
        idx
    }
}

/// A crossing between segment `seg_a` of one ring and `seg_b` of another.
struct Crossing {
    seg_a: usize,
    t: f64,
    seg_b: usize,
    u: f64,
    point: [f64; 2],
}

/// Polygonize closed, open-form rings. Vertices closer than `snap` merge.
pub(crate) fn polygonize(rings: &[Vec<[f64; 2]>], snap: f64) -> Vec<GraphFace> {
    let rings: Vec<&Vec<[f64; 2]>> = rings.iter().filter(|r| r.len() >= 3).collect();
    if rings.is_empty() {
        return Vec::new();
    }

    // 1. Split parameters per ring segment
    let bounds: Vec<Bounds2> = rings
        .iter()
        .map(|r| Bounds2::from_points(r).expanded(snap))
        .collect();
    let ring_tree = bounds_tree(&bounds);
    let segment_trees: Vec<RTree<IndexedBounds>> = rings.iter().map(|r| segment_tree(r)).collect();
    let mut splits: Vec<Vec<Vec<(f64, [f64; 2])>>> =
        rings.iter().map(|r| vec![Vec::new(); r.len()]).collect();

    for i in 0..rings.len() {
        let mut others: Vec<usize> = ring_tree
            .locate_in_envelope_intersecting(&bounds[i].envelope())
            .map(|b| b.data)
            .filter(|&j| j > i)
            .collect();
        others.sort_unstable();

        for j in others {
            for c in find_crossings(rings[i], rings[j], &segment_trees[j], snap) {
                splits[i][c.seg_a].push((c.t, c.point));
                splits[j][c.seg_b].push((c.u, c.point));
            }
        }
    }

    // 2. Planar graph
    let (vertices, mut edges) = build_planar_graph(&rings, &splits, snap);
    if edges.is_empty() {
        return Vec::new();
    }

    // 3. Link half-edges by sorting around vertices
    link_half_edges(&vertices, &mut edges);

    // 4. Extract faces by following half-edge chains
    let faces = extract_faces(&mut edges);

    // 5. Label connected clusters
    let components = label_components(vertices.len(), &edges);
    let mut component_order: HashMap<usize, usize> = HashMap::new();

    faces
        .into_iter()
        .filter(|face| face.len() >= 3)
        .map(|face| {
            let ring: Vec<[f64; 2]> = face.iter().map(|&e| vertices[edges[e].start].pos).collect();
            let root = components[edges[face[0]].start];
            let next_id = component_order.len();
            let component = *component_order.entry(root).or_insert(next_id);
            GraphFace {
                signed_area: polygon_signed_area(&ring),
                ring,
                component,
            }
        })
        .collect()
}

/// Segment boxes of a closed ring, tagged with the segment's start index.
fn segment_tree(ring: &[[f64; 2]]) -> RTree<IndexedBounds> {
    let n = ring.len();
    let boxes: Vec<Bounds2> = (0..n)
        .map(|s| Bounds2::from_points(&[ring[s], ring[(s + 1) % n]]))
        .collect();
    bounds_tree(&boxes)
}

/// All points where segments of `a` meet segments of `b`.
fn find_crossings(a: &[[f64; 2]], b: &[[f64; 2]], b_segments: &RTree<IndexedBounds>, snap: f64) -> Vec<Crossing> {
    let mut crossings = Vec::new();
    let (na, nb) = (a.len(), b.len());

    for sa in 0..na {
        let (a0, a1) = (a[sa], a[(sa + 1) % na]);
        let a_box = Bounds2::from_points(&[a0, a1]).expanded(snap);

        let mut near: Vec<usize> = b_segments
            .locate_in_envelope_intersecting(&a_box.envelope())
            .map(|s| s.data)
            .collect();
        near.sort_unstable();

        for sb in near {
            let (b0, b1) = (b[sb], b[(sb + 1) % nb]);
            match segment_intersection(a0, a1, b0, b1) {
                SegmentIntersection::Point { point, t, u } => {
                    crossings.push(Crossing { seg_a: sa, t, seg_b: sb, u, point });
                }
                SegmentIntersection::Collinear => {
                    for (t, point) in collinear_splits(a0, a1, [b0, b1]) {
                        crossings.push(Crossing { seg_a: sa, t, seg_b: sb, u: if point == b0 { 0.0 } else { 1.0 }, point });
                    }
                    for (u, point) in collinear_splits(b0, b1, [a0, a1]) {
                        crossings.push(Crossing { seg_a: sa, t: if point == a0 { 0.0 } else { 1.0 }, seg_b: sb, u, point });
                    }
                }
                SegmentIntersection::Disjoint => {}
            }
        }
    }

    crossings
}

/// Build the planar graph from ring segments and their split points.
/// Coincident segments (shared by two rings) produce a single edge.
fn build_planar_graph(
    rings: &[&Vec<[f64; 2]>],
    splits: &[Vec<Vec<(f64, [f64; 2])>>],
    snap: f64,
) -> (Vec<GraphVertex>, Vec<HalfEdge>) {
    let mut vertices: Vec<GraphVertex> = Vec::new();
    let mut edges: Vec<HalfEdge> = Vec::new();
    let mut index = VertexIndex::new(snap);
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for (r, ring) in rings.iter().enumerate() {
        let n = ring.len();
        for s in 0..n {
            let mut pts: Vec<(f64, [f64; 2])> = Vec::with_capacity(splits[r][s].len() + 2);
            pts.push((0.0, ring[s]));
            pts.extend(splits[r][s].iter().copied());
            pts.push((1.0, ring[(s + 1) % n]));
            pts.sort_by(|a, b| a.0.total_cmp(&b.0));

            let ids: Vec<usize> = pts
                .iter()
                .map(|(_, p)| index.get_or_insert(*p, &mut vertices))
                .collect();

            for pair in ids.windows(2) {
                let (v1, v2) = (pair[0], pair[1]);
                if v1 == v2 || !seen.insert((v1.min(v2), v1.max(v2))) {
                    continue;
                }

                let e1_idx = edges.len();
                let e2_idx = edges.len() + 1;
                edges.push(HalfEdge { start: v1, end: v2, twin: e2_idx, next: None, used: false });
                edges.push(HalfEdge { start: v2, end: v1, twin: e1_idx, next: None, used: false });

                vertices[v1].edges.push(e1_idx);
                vertices[v2].edges.push(e2_idx);
            }
        }
    }

    (vertices, edges)
}

/// Link half-edges by sorting edges around each vertex by angle
fn link_half_edges(vertices: &[GraphVertex], edges: &mut [HalfEdge]) {
    for vertex in vertices {
        if vertex.edges.is_empty() {
            continue;
        }

        // Sort edges by outgoing angle
        let mut sorted_edges: Vec<usize> = vertex.edges.clone();
        sorted_edges.sort_by(|&a, &b| {
            let end_a = vertices[edges[a].end].pos;
            let end_b = vertices[edges[b].end].pos;
            let angle_a = (end_a[1] - vertex.pos[1]).atan2(end_a[0] - vertex.pos[0]);
            let angle_b = (end_b[1] - vertex.pos[1]).atan2(end_b[0] - vertex.pos[0]);
            angle_a.total_cmp(&angle_b)
        });

        // Incoming edge's next = CCW next outgoing edge
        for i in 0..sorted_edges.len() {
            let outgoing = sorted_edges[i];
            let next_outgoing = sorted_edges[(i + 1) % sorted_edges.len()];
            let twin = edges[outgoing].twin;
            edges[twin].next = Some(next_outgoing);
        }
    }
}

/// Extract faces by following half-edge chains
fn extract_faces(edges: &mut [HalfEdge]) -> Vec<Vec<usize>> {
    let mut faces = Vec::new();
    let max_iterations = edges.len() * 2;

    for start_edge in 0..edges.len() {
        if edges[start_edge].used {
            continue;
        }

        let mut face = Vec::new();
        let mut current = start_edge;
        let mut iterations = 0;

        loop {
            if edges[current].used {
                break;
            }

            edges[current].used = true;
            face.push(current);

            match edges[current].next {
                Some(next) if next == start_edge => {
                    faces.push(face);
                    break;
                }
                Some(next) => current = next,
                None => break,
            }

            iterations += 1;
            if iterations > max_iterations {
                break;
            }
        }
    }

    faces
}

/// Union-find root of every vertex's connected component.
fn label_components(vertex_count: usize, edges: &[HalfEdge]) -> Vec<usize> {
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut parent: Vec<usize> = (0..vertex_count).collect();
    for edge in edges.iter().step_by(2) {
        let (a, b) = (find(&mut parent, edge.start), find(&mut parent, edge.end));
        if a != b {
            parent[a.max(b)] = a.min(b);
        }
    }

    (0..vertex_count).map(|v| find(&mut parent, v)).collect()
}
