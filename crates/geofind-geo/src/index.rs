//! The `GeoIndex` trait and the in-memory implementation.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use geofind_core::Coordinate;

use crate::distance::haversine_meters;
use crate::error::GeoIndexError;

/// Radius-query index over location ids.
///
/// Implementations must tolerate concurrent readers; `insert` with an id
/// already present replaces the stored coordinate.
pub trait GeoIndex: Send + Sync {
    /// Add or replace a location.
    ///
    /// # Errors
    ///
    /// Returns `GeoIndexError::InvalidCoordinate` for non-finite or
    /// out-of-range values; such ids are never stored.
    fn insert(&self, id: &str, coordinate: Coordinate) -> Result<(), GeoIndexError>;

    /// Ids within `radius_m` meters of `center`, nearest first, at most
    /// `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns `GeoIndexError::Store` if the backing store cannot be read.
    fn nearby(
        &self,
        center: Coordinate,
        radius_m: f64,
        limit: usize,
    ) -> Result<Vec<String>, GeoIndexError>;

    /// Number of indexed locations.
    ///
    /// # Errors
    ///
    /// Returns `GeoIndexError::Store` if the backing store cannot be read.
    fn len(&self) -> Result<usize, GeoIndexError>;

    /// # Errors
    ///
    /// Returns `GeoIndexError::Store` if the backing store cannot be read.
    fn is_empty(&self) -> Result<bool, GeoIndexError> {
        Ok(self.len()? == 0)
    }

    /// Drop every indexed location.
    ///
    /// # Errors
    ///
    /// Returns `GeoIndexError::Store` if the backing store cannot be written.
    fn clear(&self) -> Result<(), GeoIndexError>;
}

/// Check that a coordinate is finite and inside WGS84 ranges.
///
/// # Errors
///
/// Returns `GeoIndexError::InvalidCoordinate` carrying the offending values.
pub fn validate_coordinate(id: &str, c: Coordinate) -> Result<(), GeoIndexError> {
    let valid =
        c.lat.is_finite() && c.lng.is_finite() && c.lat.abs() <= 90.0 && c.lng.abs() <= 180.0;
    if valid {
        Ok(())
    } else {
        Err(GeoIndexError::InvalidCoordinate {
            id: id.to_string(),
            lat: c.lat,
            lng: c.lng,
        })
    }
}

/// In-process index backed by a `HashMap` under an `RwLock`.
///
/// Queries are linear haversine scans, which is fine at catalog scale
/// (hundreds of records). Rebuilt wholesale by the reindex job.
#[derive(Debug, Default)]
pub struct InMemoryGeoIndex {
    entries: RwLock<HashMap<String, Coordinate>>,
}

impl InMemoryGeoIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning cannot corrupt a plain map of Copy values; recover the guard.
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, Coordinate>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, Coordinate>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GeoIndex for InMemoryGeoIndex {
    fn insert(&self, id: &str, coordinate: Coordinate) -> Result<(), GeoIndexError> {
        validate_coordinate(id, coordinate)?;
        self.write_entries().insert(id.to_string(), coordinate);
        Ok(())
    }

    fn nearby(
        &self,
        center: Coordinate,
        radius_m: f64,
        limit: usize,
    ) -> Result<Vec<String>, GeoIndexError> {
        let entries = self.read_entries();
        let mut hits: Vec<(String, f64)> = entries
            .iter()
            .filter_map(|(id, coord)| {
                let d = haversine_meters(center, *coord);
                (d <= radius_m).then(|| (id.clone(), d))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.truncate(limit);
        Ok(hits.into_iter().map(|(id, _)| id).collect())
    }

    fn len(&self) -> Result<usize, GeoIndexError> {
        Ok(self.read_entries().len())
    }

    fn clear(&self) -> Result<(), GeoIndexError> {
        self.write_entries().clear();
        Ok(())
    }
}
