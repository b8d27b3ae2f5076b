//! Configuration and builder for [`GeoIndex`].

use crate::errors::{IndexError, IndexResult};
use crate::geometry::Projection;
use crate::proximity::GeoIndex;
use crate::record::GeoRecord;
use crate::rtree::{DEFAULT_MAX_ENTRIES, MIN_MAX_ENTRIES};

/// Settings for a [`GeoIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    max_entries: usize,
    reference_latitude: Option<f64>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            max_entries: DEFAULT_MAX_ENTRIES,
            reference_latitude: None,
        }
    }
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fanout limit M of the underlying tree.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Reference latitude of the planar projection, if pinned.
    ///
    /// When unset, the index picks one from the first data it sees.
    pub fn reference_latitude(&self) -> Option<f64> {
        self.reference_latitude
    }

    pub fn set_max_entries(&mut self, max_entries: usize) -> IndexResult<()> {
        if max_entries < MIN_MAX_ENTRIES {
            return Err(IndexError::InvalidConfiguration(format!(
                "max_entries must be at least {}, got: {}",
                MIN_MAX_ENTRIES, max_entries
            )));
        }
        self.max_entries = max_entries;
        Ok(())
    }

    pub fn set_reference_latitude(&mut self, latitude: f64) -> IndexResult<()> {
        Projection::new(latitude)?;
        self.reference_latitude = Some(latitude);
        Ok(())
    }
}

/// Builder for creating and configuring a [`GeoIndex`].
///
/// Setters capture the first validation error; it is returned when the
/// index is opened or built, so a chain of calls needs only one `?`.
///
/// # Examples
///
/// ```rust
/// use poi_rtree::{GeoIndex, GeoIndexBuilder, Poi};
///
/// # fn main() -> Result<(), poi_rtree::IndexError> {
/// let index: GeoIndex<Poi> = GeoIndexBuilder::new()
///     .max_entries(16)
///     .reference_latitude(35.68)
///     .open()?;
/// assert!(index.is_empty());
///
/// let bad = GeoIndexBuilder::new().max_entries(1).open::<Poi>();
/// assert!(bad.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GeoIndexBuilder {
    error: Option<IndexError>,
    config: IndexConfig,
}

impl GeoIndexBuilder {
    pub fn new() -> Self {
        GeoIndexBuilder {
            error: None,
            config: IndexConfig::new(),
        }
    }

    /// Sets the maximum number of entries per node (must be at least 2).
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_max_entries(max_entries) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Pins the reference latitude used to project records into the plane.
    pub fn reference_latitude(mut self, latitude: f64) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_reference_latitude(latitude) {
                self.error = Some(e);
            }
        }
        self
    }

    /// The configuration collected so far.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Opens an empty index with the collected configuration.
    pub fn open<T: GeoRecord>(self) -> IndexResult<GeoIndex<T>> {
        if let Some(e) = self.error {
            return Err(e);
        }
        GeoIndex::with_config(self.config)
    }

    /// Opens an index and inserts every record into it.
    pub fn build<T, I>(self, records: I) -> IndexResult<GeoIndex<T>>
    where
        T: GeoRecord,
        I: IntoIterator<Item = T>,
    {
        let mut index = self.open()?;
        index.insert_all(records)?;
        Ok(index)
    }
}
