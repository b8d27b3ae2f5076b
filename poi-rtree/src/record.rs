//! Records that can be stored in a [`GeoIndex`](crate::GeoIndex).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::geometry::GeoPoint;

/// A record with a geographic position.
///
/// The index never looks inside a record beyond these two accessors; the
/// rest of the payload is opaque to it.
pub trait GeoRecord {
    /// Latitude in degrees.
    fn latitude(&self) -> f64;

    /// Longitude in degrees.
    fn longitude(&self) -> f64;
}

impl GeoRecord for GeoPoint {
    fn latitude(&self) -> f64 {
        GeoPoint::latitude(self)
    }

    fn longitude(&self) -> f64 {
        GeoPoint::longitude(self)
    }
}

impl<R: GeoRecord + ?Sized> GeoRecord for &R {
    fn latitude(&self) -> f64 {
        (**self).latitude()
    }

    fn longitude(&self) -> f64 {
        (**self).longitude()
    }
}

/// A point of interest as produced by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Poi {
    pub fn new(id: impl Into<String>, label: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            latitude,
            longitude,
        }
    }
}

impl GeoRecord for Poi {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Display for Poi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] ({:.5}, {:.5})", self.label, self.id, self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poi_accessors() {
        let poi = Poi::new("node/1", "Lawson", 35.6812, 139.7671);
        assert_eq!(poi.id, "node/1");
        assert_eq!(GeoRecord::latitude(&poi), 35.6812);
        assert_eq!(GeoRecord::longitude(&poi), 139.7671);
    }

    #[test]
    fn test_geo_record_through_reference() {
        fn lat_of<R: GeoRecord>(record: R) -> f64 {
            record.latitude()
        }
        let poi = Poi::new("node/2", "FamilyMart", 1.0, 2.0);
        assert_eq!(lat_of(&poi), 1.0);

        let point = GeoPoint::new(3.0, 4.0).unwrap();
        assert_eq!(lat_of(point), 3.0);
        assert_eq!(GeoRecord::longitude(&point), 4.0);
    }

    #[test]
    fn test_poi_display() {
        let poi = Poi::new("node/3", "7-Eleven", 35.0, 139.5);
        assert_eq!(poi.to_string(), "7-Eleven [node/3] (35.00000, 139.50000)");
    }

    #[test]
    fn test_poi_serialization() {
        let poi = Poi::new("node/4", "Ministop", 35.1, 139.2);
        let json = serde_json::to_string(&poi).unwrap();
        let back: Poi = serde_json::from_str(&json).unwrap();
        assert_eq!(poi, back);
    }
}
