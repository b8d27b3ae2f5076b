use poi_rtree::{Rectangle, SpatialTree};
use poi_rtree_int_test::test_util::{create_test_context, random_tokyo_pois, run_test};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_rect(rng: &mut StdRng) -> Rectangle {
    let x = rng.gen_range(-1_000.0..1_000.0);
    let y = rng.gen_range(-1_000.0..1_000.0);
    if rng.gen_bool(0.5) {
        Rectangle::point(x, y)
    } else {
        Rectangle::new(x, y, x + rng.gen_range(0.0..50.0), y + rng.gen_range(0.0..50.0))
    }
}

#[test]
fn test_small_fanout_scenario() {
    let mut tree = SpatialTree::new(2).unwrap();
    for (i, (x, y)) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (5.0, 5.0), (5.0, 6.0)].into_iter().enumerate() {
        tree.insert(Rectangle::point(x, y), i).unwrap();
    }
    assert!(tree.stats().split_count >= 1);

    let mut found: Vec<usize> = tree
        .search(&Rectangle::new(-1.0, -1.0, 2.0, 2.0))
        .unwrap()
        .into_iter()
        .copied()
        .collect();
    found.sort_unstable();
    assert_eq!(found, vec![0, 1, 2]);
}

#[test]
fn test_invariants_hold_after_every_insert() {
    let mut rng = StdRng::seed_from_u64(1234);
    for max_entries in [2, 3, 5, 9] {
        let mut tree = SpatialTree::new(max_entries).unwrap();
        for i in 0..400 {
            tree.insert(random_rect(&mut rng), i).unwrap();
            if i % 25 == 0 {
                let report = tree.check_integrity();
                assert!(report.is_valid, "M = {}: {:?}", max_entries, report.errors);
            }
        }
        let report = tree.check_integrity();
        assert!(report.is_valid, "M = {}: {:?}", max_entries, report.errors);
        assert_eq!(report.leaf_depths.len(), 1);
        assert_eq!(report.records_reachable, 400);
    }
}

#[test]
fn test_search_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut tree = SpatialTree::new(4).unwrap();
    for i in 0..2_000 {
        tree.insert(random_rect(&mut rng), i).unwrap();
    }

    for _ in 0..100 {
        let query = random_rect(&mut rng);
        let mut expected: Vec<usize> = tree
            .iter()
            .filter(|(rect, _)| rect.intersects(&query))
            .map(|(_, id)| *id)
            .collect();
        expected.sort_unstable();

        let mut found: Vec<usize> = tree.search(&query).unwrap().into_iter().copied().collect();
        found.sort_unstable();
        assert_eq!(found, expected);
    }
}

#[test]
fn test_node_bounds_nest() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut tree = SpatialTree::new(3).unwrap();
    for i in 0..300 {
        tree.insert(random_rect(&mut rng), i).unwrap();
    }

    let bounds = tree.node_bounds();
    assert_eq!(bounds.len() as u64, tree.stats().node_count);
    assert_eq!(Some(bounds[0].bounds), tree.bounds());

    // Pre-order: every node is contained in the closest shallower node
    // listed before it
    for (i, node) in bounds.iter().enumerate().skip(1) {
        let parent = bounds[..i].iter().rev().find(|b| b.depth + 1 == node.depth).unwrap();
        assert!(parent.bounds.contains(&node.bounds));
    }
}

#[test]
fn test_geo_index_tree_stays_valid() {
    run_test(
        || create_test_context(random_tokyo_pois(55, 10_000), 32),
        |ctx| {
            let tree = ctx.index().tree();
            let report = tree.check_integrity();
            assert!(report.is_valid, "{:?}", report.errors);
            assert_eq!(report.records_reachable, 10_000);

            let stats = tree.stats();
            assert_eq!(stats.total_entries, 10_000);
            assert_eq!(stats.max_entries, 32);
            assert_eq!(stats.height, tree.height());
            assert!(stats.split_count > 0);
            Ok(())
        },
    )
}
