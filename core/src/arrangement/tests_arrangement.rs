use super::*;
use crate::projection::IdentityProjector;
use crate::resolve::{contributors_at, representative_point, OverlapResolver};
use crate::zone::{build_zones, Entity};

fn config() -> OverlapConfig {
    OverlapConfig {
        circle_points: 64,
        min_layer: 2,
        tolerance: 0.1,
    }
}

/// Zones at planar `(x, y)` centers. The identity projector maps lon to x.
fn zones(circles: &[([f64; 2], f64)]) -> Vec<Zone> {
    zones_with(circles, config().circle_points)
}

fn zones_with(circles: &[([f64; 2], f64)], circle_points: usize) -> Vec<Zone> {
    let entities: Vec<Entity> = circles
        .iter()
        .enumerate()
        .map(|(i, (c, r))| Entity::new(format!("Z{}", i), format!("Zone {}", i), c[1], c[0], *r))
        .collect();
    build_zones(&entities, &IdentityProjector, circle_points).unwrap()
}

fn build(circles: &[([f64; 2], f64)]) -> Arrangement {
    ArrangementBuilder::new(config()).build(&zones(circles)).unwrap()
}

fn layers(arrangement: &Arrangement) -> Vec<usize> {
    let mut l: Vec<usize> = arrangement.cells.iter().map(|c| c.layer).collect();
    l.sort_unstable();
    l
}

/// `count` circles of 1000 m at pseudo-random centers in an `extent` square.
fn scattered(count: usize, extent: f64, seed: u64) -> Vec<([f64; 2], f64)> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..count).map(|_| ([next() * extent, next() * extent], 1000.0)).collect()
}

fn triangle(side: f64) -> Vec<([f64; 2], f64)> {
    let h = side * 3f64.sqrt() / 2.0;
    vec![
        ([0.0, 0.0], 1000.0),
        ([side, 0.0], 1000.0),
        ([side / 2.0, h], 1000.0),
    ]
}

#[test]
fn test_too_few_zones_is_empty() {
    let none = build(&[]);
    assert!(none.cells.is_empty());
    assert_eq!(none.zone_count, 0);

    let one = build(&[([0.0, 0.0], 1000.0)]);
    assert!(one.cells.is_empty());
    assert_eq!(one.zone_count, 1);
}

#[test]
fn test_two_disjoint_zones() {
    let arr = build(&[([0.0, 0.0], 1000.0), ([5000.0, 0.0], 1000.0)]);
    assert_eq!(arr.face_count, 4);
    assert_eq!(arr.discarded, vec![0, 2]);
    assert_eq!(layers(&arr), vec![1, 1]);
    assert_eq!(arr.candidates(2).count(), 0);
}

#[test]
fn test_two_overlapping_zones() {
    let arr = build(&[([0.0, 0.0], 1000.0), ([1000.0, 0.0], 1000.0)]);
    assert_eq!(arr.discarded, vec![0]);
    assert_eq!(layers(&arr), vec![1, 1, 2]);

    let lens: Vec<&Cell> = arr.candidates(2).collect();
    assert_eq!(lens.len(), 1);
    assert!(lens[0].contains([500.0, 0.0]));
    assert!(!lens[0].contains([-500.0, 0.0]));
}

#[test]
fn test_triple_overlap() {
    let arr = build(&triangle(800.0));
    assert_eq!(layers(&arr), vec![1, 1, 1, 2, 2, 2, 3]);

    let triple: Vec<&Cell> = arr.candidates(3).collect();
    assert_eq!(triple.len(), 1);
    let centroid = [400.0, 800.0 * 3f64.sqrt() / 6.0];
    assert!(triple[0].contains(centroid));
}

#[test]
fn test_pairwise_overlap_without_common_point() {
    // Circumradius ~1097 m exceeds the 1000 m radius: no triple cell, and
    // the uncovered middle becomes a bounded cell of its own.
    let arr = build(&triangle(1900.0));
    assert_eq!(layers(&arr), vec![0, 1, 1, 1, 2, 2, 2]);
    assert_eq!(arr.candidates(3).count(), 0);

    let hole = arr.cells.iter().find(|c| c.layer == 0).unwrap();
    let centroid = [950.0, 1900.0 * 3f64.sqrt() / 6.0];
    assert!(hole.contains(centroid));
}

#[test]
fn test_cells_are_pairwise_disjoint() {
    let arr = build(&triangle(800.0));
    for (i, a) in arr.cells.iter().enumerate() {
        for b in &arr.cells[i + 1..] {
            assert!(
                !a.to_geo().intersects(&b.to_geo()),
                "cells {} and {} overlap",
                a.piece,
                b.piece
            );
        }
    }
}

#[test]
fn test_pieces_are_sequential() {
    let arr = build(&triangle(800.0));
    for (i, cell) in arr.cells.iter().enumerate() {
        assert_eq!(cell.piece, i);
        assert!(cell.area() > 0.0);
        assert!(polygon_signed_area(&cell.exterior) > 0.0);
    }
}

#[test]
fn test_build_is_deterministic() {
    let circles = triangle(1200.0);
    assert_eq!(build(&circles), build(&circles));
}

#[test]
fn test_nested_zone_becomes_hole() {
    let arr = build(&[([0.0, 0.0], 1000.0), ([100.0, 50.0], 200.0)]);
    assert_eq!(arr.discarded.len(), 2);
    assert_eq!(layers(&arr), vec![1, 2]);

    let ring = arr.cells.iter().find(|c| c.layer == 1).unwrap();
    assert_eq!(ring.holes.len(), 1);
    assert!(!ring.contains([100.0, 50.0]));
    assert!(ring.contains([-700.0, 0.0]));

    let inner = arr.cells.iter().find(|c| c.layer == 2).unwrap();
    assert!(inner.contains([100.0, 50.0]));
}

#[test]
fn test_far_from_origin_matches_local() {
    let local = build(&triangle(800.0));
    let shifted: Vec<([f64; 2], f64)> = triangle(800.0)
        .into_iter()
        .map(|(c, r)| ([c[0] + 450_000.0, c[1] + 250_000.0], r))
        .collect();
    let far = build(&shifted);
    assert_eq!(layers(&local), layers(&far));
}

#[test]
fn test_matches_config_and_zones() {
    let circles = triangle(800.0);
    let arr = build(&circles);
    assert!(arr.matches(&config(), &zones(&circles)));

    let mut more = circles.clone();
    more.push(([5000.0, 0.0], 1000.0));
    assert!(!arr.matches(&config(), &zones(&more)));

    let finer = OverlapConfig { circle_points: 128, ..config() };
    assert!(!arr.matches(&finer, &zones(&circles)));
}

#[test]
fn test_moved_zone_invalidates_match() {
    let circles = vec![([0.0, 0.0], 100.0), ([120.0, 0.0], 100.0)];
    let arr = build(&circles);
    assert_eq!(arr.candidates(2).count(), 1);

    let moved = vec![([0.0, 0.0], 100.0), ([5000.0, 0.0], 100.0)];
    assert!(!arr.matches(&config(), &zones(&moved)));
    assert_eq!(build(&moved).candidates(2).count(), 0);
}

#[test]
fn test_layer_matches_exact_count_on_dense_layout() {
    // Fine polygons keep the circle within the tolerance of its polygon
    let config = OverlapConfig { circle_points: 360, ..config() };
    for seed in [3, 11, 29] {
        let zones = zones_with(&scattered(30, 5000.0, seed), config.circle_points);
        let arr = ArrangementBuilder::new(config).build(&zones).unwrap();
        assert!(arr.candidates(3).count() > 0, "seed {} is not dense", seed);

        for cell in arr.candidates(1) {
            let Some(p) = representative_point(cell) else {
                continue;
            };
            let exact = contributors_at(p, &zones).len();
            assert_eq!(cell.layer, exact, "seed {} piece {} at {:?}", seed, cell.piece, p);
        }

        let records = OverlapResolver::new(config.min_layer).resolve(&arr, &zones);
        assert!(records.iter().all(|r| r.contributors.len() >= config.min_layer));
    }
}

#[test]
fn test_arrangement_json_round_trip() {
    let arr = build(&[([0.0, 0.0], 1000.0), ([1000.0, 0.0], 1000.0)]);
    let json = serde_json::to_string(&arr).unwrap();
    let back: Arrangement = serde_json::from_str(&json).unwrap();
    assert_eq!(back.discarded, arr.discarded);
    assert_eq!(layers(&back), layers(&arr));
    assert!((back.cells[0].area() - arr.cells[0].area()).abs() < 1e-6);
}

fn square(min: [f64; 2], size: f64) -> Vec<[f64; 2]> {
    vec![
        min,
        [min[0] + size, min[1]],
        [min[0] + size, min[1] + size],
        [min[0], min[1] + size],
    ]
}

#[test]
fn test_artifact_scan_finds_each_silhouette() {
    let faces = vec![
        Face::new(square([0.0, 0.0], 10.0), vec![], true),
        Face::new(square([0.0, 0.0], 10.0), vec![], false),
        Face::new(square([20.0, 0.0], 5.0), vec![], true),
        Face::new(square([20.0, 0.0], 5.0), vec![], false),
        Face::new(square([40.0, 0.0], 2.0), vec![], true),
        Face::new(square([40.0, 0.0], 2.0), vec![], false),
    ];
    assert_eq!(find_artifacts(&faces).unwrap(), vec![0, 2, 4]);
}

#[test]
fn test_artifact_scan_rejects_trailing_silhouette() {
    let faces = vec![
        Face::new(square([0.0, 0.0], 10.0), vec![], true),
        Face::new(square([0.0, 0.0], 10.0), vec![], false),
        Face::new(square([20.0, 0.0], 5.0), vec![], true),
    ];
    assert!(matches!(
        find_artifacts(&faces),
        Err(OverlapError::ArrangementInvariant(_))
    ));
}

#[test]
fn test_order_faces_puts_largest_silhouette_first() {
    let rings = vec![square([0.0, 0.0], 2.0), square([10.0, 0.0], 8.0)];
    let faces = order_faces(graph::polygonize(&rings, SNAP_DISTANCE));
    assert_eq!(faces.len(), 4);
    assert!(faces[0].silhouette);
    assert!((polygon_area(&faces[0].exterior) - 64.0).abs() < 1e-9);
    assert!(!faces[1].silhouette);
    assert!(faces[2].silhouette);
    assert!(!faces[3].silhouette);
}
