use poi_rtree::errors::IndexError;
use poi_rtree_int_test::test_util::{
    brute_force_box, create_test_context, landmarks, random_tokyo_pois, run_test, sorted_ids,
    TOKYO_STATION,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_box_without_records_is_empty() {
    run_test(
        || create_test_context(landmarks(), 32),
        |ctx| {
            assert!(ctx.index().box_search(-10.0, -10.0, 10.0, 10.0)?.is_empty());
            // A box that lies between the landmarks
            assert!(ctx.index().box_search(35.66, 139.3, 35.67, 139.6)?.is_empty());
            Ok(())
        },
    )
}

#[test]
fn test_box_matches_brute_force_in_deep_trees() {
    for max_entries in [2, 3, 10] {
        run_test(
            || create_test_context(random_tokyo_pois(31 + max_entries as u64, 3_000), max_entries),
            |ctx| {
                assert!(ctx.index().tree().height() >= 3);
                let mut rng = StdRng::seed_from_u64(8);
                for _ in 0..40 {
                    let lat_min = TOKYO_STATION.0 + rng.gen_range(-0.35..0.3);
                    let lon_min = TOKYO_STATION.1 + rng.gen_range(-0.35..0.3);
                    let lat_max = lat_min + rng.gen_range(0.0..0.2);
                    let lon_max = lon_min + rng.gen_range(0.0..0.2);

                    let expected = brute_force_box(ctx.pois(), lat_min, lon_min, lat_max, lon_max);
                    let found = ctx.index().box_search(lat_min, lon_min, lat_max, lon_max)?;
                    assert_eq!(sorted_ids(&found), expected);
                }
                Ok(())
            },
        )
    }
}

#[test]
fn test_projected_box_agrees_with_box() {
    run_test(
        || create_test_context(random_tokyo_pois(4, 2_000), 8),
        |ctx| {
            let mut rng = StdRng::seed_from_u64(12);
            for _ in 0..20 {
                let lat_min = TOKYO_STATION.0 + rng.gen_range(-0.3..0.2);
                let lon_min = TOKYO_STATION.1 + rng.gen_range(-0.3..0.2);
                let lat_max = lat_min + rng.gen_range(0.01..0.1);
                let lon_max = lon_min + rng.gen_range(0.01..0.1);

                let by_box = ctx.index().box_search(lat_min, lon_min, lat_max, lon_max)?;
                let projected = ctx.index().projected_box_search(lat_min, lon_min, lat_max, lon_max)?;
                assert_eq!(sorted_ids(&projected), sorted_ids(&by_box));
            }
            Ok(())
        },
    )
}

#[test]
fn test_whole_world_box() {
    run_test(
        || create_test_context(random_tokyo_pois(6, 1_000), 16),
        |ctx| {
            assert_eq!(ctx.index().box_search(-90.0, -180.0, 90.0, 180.0)?.len(), 1_000);
            Ok(())
        },
    )
}

#[test]
fn test_rejects_inverted_box() {
    run_test(
        || create_test_context(landmarks(), 32),
        |ctx| {
            assert!(matches!(
                ctx.index().box_search(36.0, 139.0, 35.0, 140.0),
                Err(IndexError::InvalidQuery(_))
            ));
            assert!(matches!(
                ctx.index().box_search(35.0, 139.0, 36.0, 181.0),
                Err(IndexError::InvalidQuery(_))
            ));
            Ok(())
        },
    )
}
