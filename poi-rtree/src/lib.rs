//! # poi_rtree
//!
//! An in-memory R-tree for points of interest with geographic queries.
//!
//! The crate is split in two layers:
//!
//! - [`SpatialTree`]: a generic R-tree keyed by planar [`Rectangle`]s. It
//!   supports insertion with least-enlargement descent and midpoint splits,
//!   inclusive rectangle search, and structural introspection.
//! - [`GeoIndex`]: stores [`GeoRecord`]s in a `SpatialTree` under a fixed
//!   equirectangular [`Projection`] and answers radius and lat/lon box
//!   queries exactly, using great-circle distance for the final filter.
//!
//! ## Example
//!
//! ```rust
//! use poi_rtree::{GeoIndexBuilder, Poi};
//!
//! # fn main() -> Result<(), poi_rtree::IndexError> {
//! let index = GeoIndexBuilder::new().max_entries(8).build(vec![
//!     Poi::new("1", "Tokyo Station", 35.6812, 139.7671),
//!     Poi::new("2", "Shibuya Station", 35.6580, 139.7016),
//!     Poi::new("3", "Hachioji", 35.6558, 139.2160),
//! ])?;
//!
//! for (poi, meters) in index.radius_search(35.6812, 139.7671, 10_000.0)? {
//!     println!("{} at {:.0} m", poi, meters);
//! }
//!
//! let in_box = index.box_search(35.6, 139.6, 35.7, 139.8)?;
//! assert_eq!(in_box.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! The library logs through the [`log`] facade and never installs a logger.

pub mod config;
pub mod errors;
pub mod geometry;
pub mod proximity;
pub mod record;
pub mod rectangle;
pub mod rtree;

pub use config::{GeoIndexBuilder, IndexConfig};
pub use errors::{IndexError, IndexResult};
pub use geometry::{
    enclosing_windows, haversine_distance, Coordinate, GeoPoint, Projection, EARTH_RADIUS_METERS,
    METERS_PER_DEGREE,
};
pub use proximity::GeoIndex;
pub use record::{GeoRecord, Poi};
pub use rectangle::Rectangle;
pub use rtree::{IntegrityReport, NodeBounds, SpatialTree, TreeStats};
