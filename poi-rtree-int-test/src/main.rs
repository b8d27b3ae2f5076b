use poi_rtree::errors::IndexResult;
use poi_rtree::GeoIndexBuilder;
use poi_rtree_int_test::test_util::{random_tokyo_pois, TOKYO_STATION};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> IndexResult<()> {
    colog::init();
    println!("Starting stress test...");

    let count = 200000;
    let pois = random_tokyo_pois(42, count);

    let start = std::time::Instant::now();
    let index = GeoIndexBuilder::new().build(pois)?;
    let elapsed = start.elapsed();
    println!("Indexed {} records in {:?}", index.len(), elapsed);

    let queries = 1000;
    let mut rng = StdRng::seed_from_u64(7);
    let mut total_hits = 0;
    let start = std::time::Instant::now();
    for _ in 0..queries {
        let lat = TOKYO_STATION.0 + rng.gen_range(-0.2..0.2);
        let lon = TOKYO_STATION.1 + rng.gen_range(-0.2..0.2);
        total_hits += index.radius_search(lat, lon, 1_000.0)?.len();
    }
    let elapsed = start.elapsed();
    println!(
        "Ran {} radius queries in {:?}, {} hits in total",
        queries, elapsed, total_hits
    );

    let start = std::time::Instant::now();
    let nearby = index.radius_search(TOKYO_STATION.0, TOKYO_STATION.1, 5_000.0)?;
    println!("Found {} records within 5 km of Tokyo Station in {:?}", nearby.len(), start.elapsed());

    let stats = index.tree().stats();
    println!("Tree stats: {:?}", stats);

    let report = index.tree().check_integrity();
    println!(
        "Integrity: valid = {}, {} nodes checked, {} records reachable",
        report.is_valid, report.nodes_checked, report.records_reachable
    );
    Ok(())
}
