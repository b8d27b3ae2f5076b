//! Geographic helpers for the proximity index.
//!
//! This module provides:
//! - `GeoPoint`, a validated latitude/longitude pair
//! - the haversine great-circle distance used for exact filtering
//! - `Projection`, the equirectangular mapping from degrees to planar meters
//!   under which records are stored in the R-tree
//! - `enclosing_windows`, the lat/lon boxes that cover a search disk
//!
//! ## Coordinate Order
//!
//! Functions take `(latitude, longitude)`, the natural order for geographic
//! coordinates. Rectangles that describe a lat/lon region use the Cartesian
//! convention instead: x is longitude and y is latitude.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::errors::{IndexError, IndexResult};
use crate::rectangle::Rectangle;

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Fixed meters-per-degree scale of the planar projection.
///
/// This is slightly below the true length of one degree of arc on a sphere
/// of [`EARTH_RADIUS_METERS`] (about 111 195 m), so planar offsets never
/// overstate a true distance along a meridian.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// A 2D planar coordinate (x, y) in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A geographic point with validated latitude and longitude coordinates.
///
/// ## Example
///
/// ```rust
/// use poi_rtree::GeoPoint;
///
/// let tokyo = GeoPoint::new(35.6812, 139.7671).unwrap();
/// let shibuya = GeoPoint::new(35.6580, 139.7016).unwrap();
/// let meters = tokyo.distance_meters(&shibuya);
/// assert!(meters > 6_000.0 && meters < 7_000.0);
/// ```
///
/// Deserialization goes through the same validation as [`GeoPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

/// Unchecked wire form of a [`GeoPoint`].
#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = IndexError;

    fn try_from(raw: RawGeoPoint) -> IndexResult<Self> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Creates a new GeoPoint with validated geographic coordinates.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidCoordinate`] if either value is
    /// non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> IndexResult<Self> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self { latitude, longitude })
    }

    /// Gets the latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Gets the longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to another point in meters.
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint(lat={:.6}, lon={:.6})", self.latitude, self.longitude)
    }
}

/// Checks that a latitude/longitude pair is finite and within
/// [-90, 90] x [-180, 180].
pub fn validate_coordinates(latitude: f64, longitude: f64) -> IndexResult<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(IndexError::InvalidCoordinate(format!(
            "Latitude must be between -90 and 90 degrees, got: {}",
            latitude
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(IndexError::InvalidCoordinate(format!(
            "Longitude must be between -180 and 180 degrees, got: {}",
            longitude
        )));
    }
    Ok(())
}

/// Calculates the great-circle distance in meters between two points
/// given in degrees, using the haversine formula.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Equirectangular projection of a point, scaling longitude by the cosine of
/// `scale_latitude`.
///
/// Passing the point's own latitude gives the per-point form
/// `x = lon * 111000 * cos(lat)`, `y = lat * 111000`.
pub fn equirectangular(latitude: f64, longitude: f64, scale_latitude: f64) -> Coordinate {
    Coordinate::new(
        longitude * METERS_PER_DEGREE * scale_latitude.to_radians().cos(),
        latitude * METERS_PER_DEGREE,
    )
}

/// Equirectangular projection anchored at one reference latitude.
///
/// Every point handled by one index is projected with the same reference,
/// so planar x offsets are a fixed multiple of longitude offsets. This is
/// only an approximation, accurate at city scale, and is used to select
/// candidates. Final accept/reject decisions use [`haversine_distance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    reference_latitude: f64,
}

impl Projection {
    /// Creates a projection anchored at `reference_latitude` degrees.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidConfiguration`] unless the latitude is
    /// finite and strictly between the poles.
    pub fn new(reference_latitude: f64) -> IndexResult<Self> {
        if !reference_latitude.is_finite() || reference_latitude.abs() >= 90.0 {
            return Err(IndexError::InvalidConfiguration(format!(
                "Reference latitude must lie strictly between -90 and 90 degrees, got: {}",
                reference_latitude
            )));
        }
        Ok(Self { reference_latitude })
    }

    /// The reference latitude in degrees.
    pub fn reference_latitude(&self) -> f64 {
        self.reference_latitude
    }

    /// Projects a latitude/longitude pair to planar meters.
    pub fn project(&self, latitude: f64, longitude: f64) -> Coordinate {
        equirectangular(latitude, longitude, self.reference_latitude)
    }

    /// Projects a lat/lon box (x = longitude, y = latitude) to a planar
    /// rectangle. The mapping is monotonic on both axes, so corners map to
    /// corners.
    pub fn project_box(&self, lat_lon_box: &Rectangle) -> Rectangle {
        let low = self.project(lat_lon_box.min_y, lat_lon_box.min_x);
        let high = self.project(lat_lon_box.max_y, lat_lon_box.max_x);
        Rectangle::new(
            low.x.min(high.x),
            low.y.min(high.y),
            low.x.max(high.x),
            low.y.max(high.y),
        )
    }

    /// Planar search windows for a radius query around `center`.
    ///
    /// Starts from the square of half-width `radius_meters` around the
    /// projected center and widens its x extent to the longitude reach of
    /// the disk. Windows never overlap, so a record matches at most one.
    pub fn search_windows(&self, center: &GeoPoint, radius_meters: f64) -> Vec<Rectangle> {
        let square_half_width =
            radius_meters / (METERS_PER_DEGREE * self.reference_latitude.to_radians().cos());
        let reach = longitude_reach(center, radius_meters).map(|d| d.max(square_half_width));
        windows_around(center, radius_meters, reach)
            .iter()
            .map(|window| self.project_box(window))
            .collect()
    }
}

/// Returns the lat/lon boxes (x = longitude, y = latitude) that together
/// cover every point within `radius_meters` of `center`.
///
/// The angular radius is derived from [`METERS_PER_DEGREE`], which slightly
/// overestimates it, so points on the circle itself stay inside. The
/// longitude half-width is the largest longitude offset reachable within
/// that radius from the center's latitude. A disk that reaches a pole spans
/// every longitude. A window that crosses the antimeridian is split in two
/// so that neither box leaves [-180, 180]; the first box always holds the
/// center.
pub fn enclosing_windows(center: &GeoPoint, radius_meters: f64) -> Vec<Rectangle> {
    windows_around(center, radius_meters, longitude_reach(center, radius_meters))
}

/// Largest longitude offset in degrees that a point within `radius_meters`
/// of `center` can have, or `None` when the disk spans every longitude.
pub fn longitude_reach(center: &GeoPoint, radius_meters: f64) -> Option<f64> {
    let delta_deg = radius_meters / METERS_PER_DEGREE;
    if center.latitude.abs() + delta_deg >= 90.0 {
        return None;
    }
    let spread = delta_deg.to_radians().sin() / center.latitude.to_radians().cos();
    if spread >= 1.0 {
        return None;
    }
    Some(spread.asin().to_degrees())
}

fn windows_around(center: &GeoPoint, radius_meters: f64, delta_lon: Option<f64>) -> Vec<Rectangle> {
    let delta_deg = radius_meters / METERS_PER_DEGREE;
    let lat_min = (center.latitude - delta_deg).max(-90.0);
    let lat_max = (center.latitude + delta_deg).min(90.0);

    let delta_lon = match delta_lon {
        Some(d) if d < 180.0 => d,
        _ => return vec![Rectangle::new(-180.0, lat_min, 180.0, lat_max)],
    };
    let lon_min = center.longitude - delta_lon;
    let lon_max = center.longitude + delta_lon;

    if lon_min < -180.0 {
        vec![
            Rectangle::new(-180.0, lat_min, lon_max, lat_max),
            Rectangle::new(lon_min + 360.0, lat_min, 180.0, lat_max),
        ]
    } else if lon_max > 180.0 {
        vec![
            Rectangle::new(lon_min, lat_min, 180.0, lat_max),
            Rectangle::new(-180.0, lat_min, lon_max - 360.0, lat_max),
        ]
    } else {
        vec![Rectangle::new(lon_min, lat_min, lon_max, lat_max)]
    }
}
