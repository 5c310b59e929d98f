use nfer_core::{BritishNationalGrid, CoordinateProjector, Entity, OverlapConfig, Pipeline, ResolvedOverlap};

/// Entities placed at planar offsets (meters) from a point near Oxford.
fn entities_at(offsets: &[[f64; 2]], radius: f64) -> Vec<Entity> {
    let grid = BritishNationalGrid::new();
    let origin = grid.to_planar(51.75, -1.25);
    offsets
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let g = grid.to_geographic(origin[0] + o[0], origin[1] + o[1]);
            Entity::new(format!("GB-{:04}", i + 1), format!("Site {}", i + 1), g.lat, g.lon, radius)
        })
        .collect()
}

fn triangle(side: f64) -> Vec<[f64; 2]> {
    vec![[0.0, 0.0], [side, 0.0], [side / 2.0, side * 3f64.sqrt() / 2.0]]
}

fn run(entities: &[Entity], min_layer: usize) -> Vec<ResolvedOverlap> {
    let config = OverlapConfig { min_layer, ..OverlapConfig::default() };
    Pipeline::new(BritishNationalGrid::new(), config).unwrap().run(entities).unwrap()
}

fn counts(results: &[ResolvedOverlap]) -> Vec<usize> {
    results.iter().map(|r| r.count()).collect()
}

#[test]
fn test_two_disjoint_entities() {
    let entities = entities_at(&[[0.0, 0.0], [5000.0, 0.0]], 1000.0);
    assert!(run(&entities, 2).is_empty());
}

#[test]
fn test_two_overlapping_entities() {
    let entities = entities_at(&[[0.0, 0.0], [1200.0, 0.0]], 1000.0);
    let results = run(&entities, 2);
    assert_eq!(results.len(), 1);
    let refs: Vec<&str> = results[0].contributors.iter().map(|c| c.reference.as_str()).collect();
    assert_eq!(refs, vec!["GB-0001", "GB-0002"]);
    assert_eq!(results[0].label(), "2-fer");
}

#[test]
fn test_triple_overlap() {
    let entities = entities_at(&triangle(900.0), 1000.0);

    let triples = run(&entities, 3);
    assert_eq!(counts(&triples), vec![3]);

    let all = run(&entities, 2);
    assert_eq!(counts(&all), vec![3, 2, 2, 2]);
}

#[test]
fn test_pairwise_overlap_without_triple_point() {
    let entities = entities_at(&triangle(1900.0), 1000.0);
    assert!(run(&entities, 3).is_empty());
    assert_eq!(counts(&run(&entities, 2)), vec![2, 2, 2]);
}

#[test]
fn test_mutually_close_entities_make_a_triple() {
    let entities = entities_at(&[[0.0, 0.0], [600.0, 100.0], [250.0, 700.0]], 1000.0);
    assert!(run(&entities, 2).iter().any(|r| r.count() == 3));
}

#[test]
fn test_point_lies_in_every_contributor() {
    let entities = entities_at(&[[0.0, 0.0], [700.0, 0.0], [300.0, 600.0], [2500.0, 0.0]], 1000.0);
    let grid = BritishNationalGrid::new();
    for result in run(&entities, 2) {
        let p = grid.to_planar(result.point.lat, result.point.lon);
        for e in &entities {
            let c = grid.to_planar(e.lat, e.lon);
            let d = ((p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2)).sqrt();
            let listed = result.contributors.iter().any(|x| x.reference == e.reference);
            assert_eq!(listed, d < e.radius_metres, "{} in {}", e.reference, result.piece);
        }
    }
}

#[test]
fn test_boundaries_are_closed_rings() {
    let entities = entities_at(&triangle(900.0), 1000.0);
    for result in run(&entities, 2) {
        assert!(result.boundary.len() >= 4);
        assert_eq!(result.boundary.first(), result.boundary.last());
    }
}

#[test]
fn test_identical_input_gives_identical_output() {
    let entities = entities_at(&[[0.0, 0.0], [800.0, 0.0], [400.0, 650.0], [1400.0, 500.0]], 1000.0);
    assert_eq!(run(&entities, 2), run(&entities, 2));
}

#[test]
fn test_ties_keep_discovery_order() {
    let entities = entities_at(&triangle(1900.0), 1000.0);
    let results = run(&entities, 2);
    let pieces: Vec<usize> = results.iter().map(|r| r.piece).collect();
    let mut sorted = pieces.clone();
    sorted.sort_unstable();
    assert_eq!(pieces, sorted);
}

#[test]
fn test_cached_arrangement_gives_same_results() {
    let entities = entities_at(&triangle(900.0), 1000.0);
    let pipeline = Pipeline::new(BritishNationalGrid::new(), OverlapConfig { min_layer: 2, ..OverlapConfig::default() }).unwrap();

    let zones = pipeline.build_zones(&entities).unwrap();
    let arrangement = pipeline.build_arrangement(&zones).unwrap();
    let stored = serde_json::to_string(&arrangement).unwrap();
    let restored: nfer_core::Arrangement = serde_json::from_str(&stored).unwrap();
    assert!(restored.matches(pipeline.config(), &zones));

    let cached = pipeline.assemble(pipeline.resolve(&restored, &zones));
    let direct = pipeline.run(&entities).unwrap();
    let ids = |r: &[ResolvedOverlap]| r.iter().map(|o| o.id).collect::<Vec<_>>();
    assert_eq!(ids(&cached), ids(&direct));
}
