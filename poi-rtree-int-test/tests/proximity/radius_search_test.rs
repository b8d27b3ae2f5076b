use poi_rtree::errors::IndexError;
use poi_rtree::{GeoIndex, GeoIndexBuilder, Poi};
use poi_rtree_int_test::test_util::{
    brute_force_radius, create_test_context, hits_by_id, landmarks, random_pois, random_tokyo_pois,
    run_test, TOKYO_STATION,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_landmarks_within_five_km() {
    run_test(
        || create_test_context(landmarks(), 32),
        |ctx| {
            let hits = ctx.index().radius_search(TOKYO_STATION.0, TOKYO_STATION.1, 5_000.0)?;
            let labels: Vec<&str> = hits.iter().map(|(p, _)| p.label.as_str()).collect();
            assert_eq!(labels, vec!["Tokyo Station"]);

            let hits = ctx.index().radius_search(TOKYO_STATION.0, TOKYO_STATION.1, 60_000.0)?;
            let labels: Vec<&str> = hits.iter().map(|(p, _)| p.label.as_str()).collect();
            assert_eq!(labels, vec!["Tokyo Station", "Shibuya Station", "Hachioji"]);
            assert!(hits[2].1 > 45_000.0 && hits[2].1 < 55_000.0);
            Ok(())
        },
    )
}

#[test]
fn test_matches_brute_force_for_several_fanouts() {
    for max_entries in [2, 4, 16, 32] {
        run_test(
            || create_test_context(random_tokyo_pois(max_entries as u64, 4_000), max_entries),
            |ctx| {
                let mut rng = StdRng::seed_from_u64(99);
                for _ in 0..30 {
                    let lat = TOKYO_STATION.0 + rng.gen_range(-0.3..0.3);
                    let lon = TOKYO_STATION.1 + rng.gen_range(-0.3..0.3);
                    let radius = rng.gen_range(0.0..15_000.0);

                    let expected = brute_force_radius(ctx.pois(), lat, lon, radius);
                    let found = hits_by_id(&ctx.index().radius_search(lat, lon, radius)?);
                    assert_eq!(found.len(), expected.len());
                    for ((id, d), (expected_id, expected_d)) in found.iter().zip(expected.iter()) {
                        assert_eq!(id, expected_id);
                        assert!((d - expected_d).abs() <= 1e-6 * expected_d.max(1.0));
                    }
                }
                Ok(())
            },
        )
    }
}

#[test]
fn test_results_ascend_by_distance() {
    run_test(
        || create_test_context(random_tokyo_pois(5, 5_000), 8),
        |ctx| {
            let hits = ctx.index().radius_search(TOKYO_STATION.0, TOKYO_STATION.1, 10_000.0)?;
            assert!(hits.len() > 10);
            assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
            Ok(())
        },
    )
}

#[test]
fn test_box_variant_agrees_with_planar_variant() {
    run_test(
        || create_test_context(random_tokyo_pois(17, 3_000), 6),
        |ctx| {
            let mut rng = StdRng::seed_from_u64(3);
            for _ in 0..30 {
                let lat = TOKYO_STATION.0 + rng.gen_range(-0.3..0.3);
                let lon = TOKYO_STATION.1 + rng.gen_range(-0.3..0.3);
                let radius = rng.gen_range(100.0..20_000.0);

                let planar = hits_by_id(&ctx.index().radius_search(lat, lon, radius)?);
                let by_box = hits_by_id(&ctx.index().radius_search_by_box(lat, lon, radius)?);
                assert_eq!(planar, by_box);
            }
            Ok(())
        },
    )
}

#[test]
fn test_global_records_across_antimeridian() {
    run_test(
        || create_test_context(random_pois(8, 3_000, 0.0, 180.0, 20.0), 12),
        |ctx| {
            for (lat, lon) in [(0.0, 180.0), (5.0, -179.5), (-8.0, 179.0), (9.9, -170.0)] {
                let expected = brute_force_radius(ctx.pois(), lat, lon, 300_000.0);
                assert!(!expected.is_empty());
                let found = hits_by_id(&ctx.index().radius_search(lat, lon, 300_000.0)?);
                assert_eq!(found, expected);
                let by_box = hits_by_id(&ctx.index().radius_search_by_box(lat, lon, 300_000.0)?);
                assert_eq!(by_box, expected);
            }
            Ok(())
        },
    )
}

#[test]
fn test_huge_radius_returns_everything() {
    run_test(
        || create_test_context(random_tokyo_pois(2, 500), 32),
        |ctx| {
            let hits = ctx.index().radius_search(0.0, 0.0, 20_100_000.0)?;
            assert_eq!(hits.len(), 500);
            Ok(())
        },
    )
}

#[test]
fn test_rejects_malformed_queries() {
    let index = GeoIndex::build(landmarks()).unwrap();
    for radius in [-0.5, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            index.radius_search(TOKYO_STATION.0, TOKYO_STATION.1, radius),
            Err(IndexError::InvalidQuery(_))
        ));
    }
    assert!(matches!(
        index.radius_search(-91.0, 0.0, 1.0),
        Err(IndexError::InvalidQuery(_))
    ));
}

#[test]
fn test_incremental_inserts_keep_answering() {
    let mut index: GeoIndex<Poi> = GeoIndexBuilder::new().max_entries(4).open().unwrap();
    let pois = random_tokyo_pois(23, 600);
    for (i, poi) in pois.iter().cloned().enumerate() {
        index.insert(poi).unwrap();
        if i % 100 == 99 {
            let expected = brute_force_radius(&pois[..=i], TOKYO_STATION.0, TOKYO_STATION.1, 8_000.0);
            let found = hits_by_id(&index.radius_search(TOKYO_STATION.0, TOKYO_STATION.1, 8_000.0).unwrap());
            assert_eq!(found, expected);
        }
    }
    assert!(index.tree().check_integrity().is_valid);
}
