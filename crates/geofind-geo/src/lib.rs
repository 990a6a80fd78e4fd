//! Geospatial index for location discovery.
//!
//! Radius queries over catalog location ids. The bundled backend keeps
//! everything in process memory and is rebuilt wholesale by the reindex job.

pub mod distance;
pub mod error;
pub mod index;

pub use distance::haversine_meters;
pub use error::GeoIndexError;
pub use index::{validate_coordinate, GeoIndex, InMemoryGeoIndex};
