//! Geographic queries on top of [`SpatialTree`].
//!
//! A [`GeoIndex`] projects each record's latitude/longitude into the plane
//! with one fixed [`Projection`] and stores it as a point rectangle. Queries
//! run in two phases: the tree yields a cheap candidate superset, then every
//! candidate is checked exactly against the query in geographic terms.

use crate::config::IndexConfig;
use crate::errors::{IndexError, IndexResult};
use crate::geometry::{enclosing_windows, haversine_distance, validate_coordinates, GeoPoint, Projection};
use crate::record::GeoRecord;
use crate::rectangle::Rectangle;
use crate::rtree::rtree_constants::BUILD_PROGRESS_INTERVAL;
use crate::rtree::{NodeId, SpatialTree};

/// Highest absolute latitude picked automatically as a reference latitude.
const MAX_AUTO_REFERENCE_LATITUDE: f64 = 89.0;

/// A spatial index of geographic records.
///
/// # Example
///
/// ```rust
/// use poi_rtree::{GeoIndex, Poi};
///
/// let index = GeoIndex::build(vec![
///     Poi::new("1", "Tokyo Station", 35.6812, 139.7671),
///     Poi::new("2", "Shibuya Station", 35.6580, 139.7016),
/// ])
/// .unwrap();
///
/// let nearby = index.radius_search(35.6812, 139.7671, 1_000.0).unwrap();
/// assert_eq!(nearby.len(), 1);
/// assert_eq!(nearby[0].0.label, "Tokyo Station");
/// ```
#[derive(Debug, Clone)]
pub struct GeoIndex<T> {
    tree: SpatialTree<T>,
    projection: Option<Projection>,
}

impl<T> Default for GeoIndex<T> {
    fn default() -> Self {
        GeoIndex {
            tree: SpatialTree::default(),
            projection: None,
        }
    }
}

impl<T> GeoIndex<T> {
    /// Creates an empty index from a configuration.
    pub fn with_config(config: IndexConfig) -> IndexResult<Self> {
        let tree = SpatialTree::new(config.max_entries())?;
        let projection = config.reference_latitude().map(Projection::new).transpose()?;
        Ok(GeoIndex { tree, projection })
    }

    /// The underlying planar tree.
    pub fn tree(&self) -> &SpatialTree<T> {
        &self.tree
    }

    /// The projection in use, or `None` until the first record arrives.
    pub fn projection(&self) -> Option<Projection> {
        self.projection
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl<T: GeoRecord> GeoIndex<T> {
    /// Builds an index with the default configuration from `records`.
    ///
    /// The reference latitude is the midpoint of the batch's latitude range.
    pub fn build<I>(records: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut index = Self::default();
        index.insert_all(records)?;
        Ok(index)
    }

    /// Inserts a single record.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidCoordinate`] if the record's position is
    /// not a valid latitude/longitude. The index is left unchanged.
    pub fn insert(&mut self, record: T) -> IndexResult<()> {
        let (latitude, longitude) = (record.latitude(), record.longitude());
        validate_coordinates(latitude, longitude)?;

        let projection = match self.projection {
            Some(projection) => projection,
            None => self.fix_projection(latitude)?,
        };
        let point = projection.project(latitude, longitude);
        self.tree.insert(Rectangle::point(point.x, point.y), record)
    }

    /// Inserts records one at a time, stopping at the first invalid one.
    ///
    /// Records before the invalid one stay indexed; the ones after it are
    /// dropped. Returns the number of records inserted.
    pub fn insert_all<I>(&mut self, records: I) -> IndexResult<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let records: Vec<T> = records.into_iter().collect();
        let total = records.len();

        if self.projection.is_none() {
            if let Some(midpoint) = latitude_midpoint(&records) {
                self.fix_projection(midpoint)?;
            }
        }

        for (i, record) in records.into_iter().enumerate() {
            self.insert(record)?;
            if (i + 1) % BUILD_PROGRESS_INTERVAL == 0 {
                log::debug!("Indexed {} of {} records", i + 1, total);
            }
        }

        log::debug!(
            "Finished indexing {} records, index holds {} with height {}",
            total,
            self.tree.len(),
            self.tree.height()
        );
        Ok(total)
    }

    /// Returns every record within `radius_meters` great-circle distance of
    /// (`latitude`, `longitude`), with its distance, nearest first.
    ///
    /// Records at equal distance keep the order in which the tree found
    /// them.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidQuery`] for an invalid center or a
    /// radius that is negative or not finite.
    pub fn radius_search(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> IndexResult<Vec<(&T, f64)>> {
        let center = query_point(latitude, longitude)?;
        check_radius(radius_meters)?;
        let Some(projection) = self.projection else {
            return Ok(Vec::new());
        };

        let mut candidates = Vec::new();
        for window in projection.search_windows(&center, radius_meters) {
            candidates.extend(self.tree.search(&window)?);
        }
        Ok(within_radius(&center, radius_meters, candidates))
    }

    /// Same contract as [`radius_search`](Self::radius_search), but selects
    /// candidates with [`box_search`](Self::box_search) over lat/lon windows
    /// enclosing the disk instead of planar windows.
    pub fn radius_search_by_box(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> IndexResult<Vec<(&T, f64)>> {
        let center = query_point(latitude, longitude)?;
        check_radius(radius_meters)?;

        let extents = self.geo_extents();
        let mut candidates = Vec::new();
        for window in enclosing_windows(&center, radius_meters) {
            candidates.extend(self.collect_in_box(&window, &extents));
        }
        Ok(within_radius(&center, radius_meters, candidates))
    }

    /// Returns every record whose own latitude/longitude lies in the closed
    /// box.
    ///
    /// Nodes are pruned by the lat/lon extent of the records below them.
    /// Extents are computed on the fly, once per node per query, so the
    /// result does not depend on the projection.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidQuery`] for an invalid corner or a box
    /// whose minimum exceeds its maximum.
    pub fn box_search(
        &self,
        lat_min: f64,
        lon_min: f64,
        lat_max: f64,
        lon_max: f64,
    ) -> IndexResult<Vec<&T>> {
        let query = query_box(lat_min, lon_min, lat_max, lon_max)?;
        let extents = self.geo_extents();
        Ok(self.collect_in_box(&query, &extents))
    }

    /// Stack walk from the root that skips every node whose extent misses
    /// `query`, then filters leaf records exactly.
    fn collect_in_box(&self, query: &Rectangle, extents: &[Option<Rectangle>]) -> Vec<&T> {
        let mut results = Vec::new();
        let mut candidates = 0usize;
        let mut stack: Vec<NodeId> = vec![self.tree.root()];

        while let Some(id) = stack.pop() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            match extents.get(id).copied().flatten() {
                Some(extent) if extent.intersects(query) => {}
                _ => continue,
            }

            if let Some(entries) = node.entries() {
                candidates += entries.len();
                results.extend(
                    entries
                        .iter()
                        .map(|entry| &entry.record)
                        .filter(|record| query.contains_point(record.longitude(), record.latitude())),
                );
            } else if let Some(children) = node.children() {
                stack.extend(children.iter().rev().map(|c| c.node));
            }
        }

        log::trace!(
            "Box search {}: {} candidates, {} matches",
            query,
            candidates,
            results.len()
        );
        results
    }

    /// Projects the corners of a lat/lon box and returns the records whose
    /// planar point falls in the resulting rectangle.
    ///
    /// This is a coarse query: it is exact only as far as the projection is.
    pub fn projected_box_search(
        &self,
        lat_min: f64,
        lon_min: f64,
        lat_max: f64,
        lon_max: f64,
    ) -> IndexResult<Vec<&T>> {
        let query = query_box(lat_min, lon_min, lat_max, lon_max)?;
        match self.projection {
            Some(projection) => self.tree.search(&projection.project_box(&query)),
            None => Ok(Vec::new()),
        }
    }

    /// Lat/lon extent (x = longitude, y = latitude) of the records below
    /// every node, indexed by [`NodeId`]. Filled in one post-order pass.
    fn geo_extents(&self) -> Vec<Option<Rectangle>> {
        let mut extents = vec![None; self.tree.node_count()];
        self.fill_extent(self.tree.root(), &mut extents);
        extents
    }

    fn fill_extent(&self, id: NodeId, extents: &mut [Option<Rectangle>]) -> Option<Rectangle> {
        let node = self.tree.node(id)?;
        let extent = if let Some(entries) = node.entries() {
            entries
                .iter()
                .map(|e| Rectangle::point(e.record.longitude(), e.record.latitude()))
                .reduce(|acc, r| acc.union(&r))
        } else {
            node.children()?
                .iter()
                .filter_map(|child| self.fill_extent(child.node, extents))
                .reduce(|acc, r| acc.union(&r))
        };
        if let Some(slot) = extents.get_mut(id) {
            *slot = extent;
        }
        extent
    }

    fn fix_projection(&mut self, latitude: f64) -> IndexResult<Projection> {
        let reference = latitude.clamp(-MAX_AUTO_REFERENCE_LATITUDE, MAX_AUTO_REFERENCE_LATITUDE);
        let projection = Projection::new(reference)?;
        log::debug!("Using reference latitude {} for projection", reference);
        self.projection = Some(projection);
        Ok(projection)
    }
}

/// Midpoint of the latitude range of the valid records leading the batch.
fn latitude_midpoint<T: GeoRecord>(records: &[T]) -> Option<f64> {
    let (min, max) = records
        .iter()
        .take_while(|r| validate_coordinates(r.latitude(), r.longitude()).is_ok())
        .map(|r| r.latitude())
        .fold(None, |acc: Option<(f64, f64)>, lat| match acc {
            Some((min, max)) => Some((min.min(lat), max.max(lat))),
            None => Some((lat, lat)),
        })?;
    Some((min + max) / 2.0)
}

/// Exact haversine filter followed by a stable sort on distance.
fn within_radius<'a, T: GeoRecord>(
    center: &GeoPoint,
    radius_meters: f64,
    candidates: Vec<&'a T>,
) -> Vec<(&'a T, f64)> {
    let candidate_count = candidates.len();
    let mut hits: Vec<(&T, f64)> = candidates
        .into_iter()
        .map(|record| {
            let distance = haversine_distance(
                center.latitude(),
                center.longitude(),
                record.latitude(),
                record.longitude(),
            );
            (record, distance)
        })
        .filter(|(_, distance)| *distance <= radius_meters)
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));

    log::trace!(
        "Radius search around {} within {} m: {} candidates, {} matches",
        center,
        radius_meters,
        candidate_count,
        hits.len()
    );
    hits
}

fn query_point(latitude: f64, longitude: f64) -> IndexResult<GeoPoint> {
    GeoPoint::new(latitude, longitude).map_err(|e| match e {
        IndexError::InvalidCoordinate(msg) => IndexError::InvalidQuery(msg),
        other => other,
    })
}

fn query_box(lat_min: f64, lon_min: f64, lat_max: f64, lon_max: f64) -> IndexResult<Rectangle> {
    query_point(lat_min, lon_min)?;
    query_point(lat_max, lon_max)?;
    if lat_min > lat_max || lon_min > lon_max {
        return Err(IndexError::InvalidQuery(format!(
            "Box corners are inverted: ({}, {}) to ({}, {})",
            lat_min, lon_min, lat_max, lon_max
        )));
    }
    Ok(Rectangle::new(lon_min, lat_min, lon_max, lat_max))
}

fn check_radius(radius_meters: f64) -> IndexResult<()> {
    if !radius_meters.is_finite() || radius_meters < 0.0 {
        return Err(IndexError::InvalidQuery(format!(
            "Radius must be a finite, non-negative number of meters, got: {}",
            radius_meters
        )));
    }
    Ok(())
}
