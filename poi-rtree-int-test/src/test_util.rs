use poi_rtree::errors::IndexResult;
use poi_rtree::{haversine_distance, GeoIndex, GeoIndexBuilder, Poi};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

pub const TOKYO_STATION: (f64, f64) = (35.6812, 139.7671);
pub const SHIBUYA_STATION: (f64, f64) = (35.6580, 139.7016);
/// About 50 km west of Tokyo Station.
pub const HACHIOJI: (f64, f64) = (35.6558, 139.2160);

/// Runs a test body against a freshly built context and panics with the
/// error if either step fails.
pub fn run_test<B, T>(before: B, test: T)
where
    B: FnOnce() -> IndexResult<TestContext>,
    T: FnOnce(&TestContext) -> IndexResult<()>,
{
    let start = Instant::now();
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };
    log::debug!("Built test context of {} records in {:?}", ctx.pois.len(), start.elapsed());

    if let Err(e) = test(&ctx) {
        panic!("Test failed: {:?}", e);
    }
}

/// An index together with the records it was built from, so results can be
/// checked against a linear scan.
pub struct TestContext {
    pois: Vec<Poi>,
    index: GeoIndex<Poi>,
}

impl TestContext {
    pub fn new(pois: Vec<Poi>, index: GeoIndex<Poi>) -> Self {
        Self { pois, index }
    }

    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    pub fn index(&self) -> &GeoIndex<Poi> {
        &self.index
    }
}

pub fn landmarks() -> Vec<Poi> {
    vec![
        Poi::new("node/1", "Tokyo Station", TOKYO_STATION.0, TOKYO_STATION.1),
        Poi::new("node/2", "Shibuya Station", SHIBUYA_STATION.0, SHIBUYA_STATION.1),
        Poi::new("node/3", "Hachioji", HACHIOJI.0, HACHIOJI.1),
    ]
}

/// `count` records spread uniformly over a square of `spread` degrees
/// centred on (`latitude`, `longitude`). Latitudes are clamped to the poles
/// and longitudes wrap around the antimeridian.
pub fn random_pois(seed: u64, count: usize, latitude: f64, longitude: f64, spread: f64) -> Vec<Poi> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = spread / 2.0;
    (0..count)
        .map(|i| {
            let lat = (latitude + rng.gen_range(-half..=half)).clamp(-90.0, 90.0);
            let mut lon = longitude + rng.gen_range(-half..=half);
            if lon > 180.0 {
                lon -= 360.0;
            } else if lon < -180.0 {
                lon += 360.0;
            }
            Poi::new(format!("node/{}", i), format!("poi {}", i), lat, lon)
        })
        .collect()
}

pub fn random_tokyo_pois(seed: u64, count: usize) -> Vec<Poi> {
    random_pois(seed, count, TOKYO_STATION.0, TOKYO_STATION.1, 0.6)
}

pub fn create_test_context(pois: Vec<Poi>, max_entries: usize) -> IndexResult<TestContext> {
    let index = GeoIndexBuilder::new().max_entries(max_entries).build(pois.clone())?;
    Ok(TestContext::new(pois, index))
}

/// Every record within `radius` meters, as (id, distance) sorted by id.
pub fn brute_force_radius(pois: &[Poi], latitude: f64, longitude: f64, radius: f64) -> Vec<(String, f64)> {
    let mut hits: Vec<(String, f64)> = pois
        .iter()
        .map(|p| (p.id.clone(), haversine_distance(latitude, longitude, p.latitude, p.longitude)))
        .filter(|(_, d)| *d <= radius)
        .collect();
    hits.sort_by(|a, b| a.0.cmp(&b.0));
    hits
}

/// Ids of every record inside the closed box, sorted.
pub fn brute_force_box(pois: &[Poi], lat_min: f64, lon_min: f64, lat_max: f64, lon_max: f64) -> Vec<String> {
    let mut ids: Vec<String> = pois
        .iter()
        .filter(|p| {
            (lat_min..=lat_max).contains(&p.latitude) && (lon_min..=lon_max).contains(&p.longitude)
        })
        .map(|p| p.id.clone())
        .collect();
    ids.sort_unstable();
    ids
}

/// Radius search hits as (id, distance) sorted by id.
pub fn hits_by_id(hits: &[(&Poi, f64)]) -> Vec<(String, f64)> {
    let mut ids: Vec<(String, f64)> = hits.iter().map(|(p, d)| (p.id.clone(), *d)).collect();
    ids.sort_by(|a, b| a.0.cmp(&b.0));
    ids
}

pub fn sorted_ids(records: &[&Poi]) -> Vec<String> {
    let mut ids: Vec<String> = records.iter().map(|p| p.id.clone()).collect();
    ids.sort_unstable();
    ids
}
