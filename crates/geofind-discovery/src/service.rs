//! The discovery service and its find pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future;
use serde::Deserialize;

use geofind_catalog::CatalogClient;
use geofind_core::{Coordinate, Location};
use geofind_geo::GeoIndex;

use crate::dedup::dedup_by_longitude;
use crate::error::DiscoveryError;

/// Cap on radius hits taken from the geo index per query.
const NEARBY_LIMIT: usize = 100;

/// Search page size large enough to cover the whole result set in one call.
const SEARCH_ALL_RECORDS: u64 = 10_000;

/// A discovery query as sent by clients.
///
/// Every field is optional at the wire level so that validation happens in
/// [`DiscoveryService::discover`] rather than during deserialization. `0.0`
/// is a valid coordinate and a valid radius; only absent fields fail
/// validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub search_query: Option<String>,
}

/// Combines the geo index with the catalog's full-text search.
///
/// Cheap to clone; both halves sit behind `Arc`.
#[derive(Clone)]
pub struct DiscoveryService {
    pub(crate) index: Arc<dyn GeoIndex>,
    pub(crate) catalog: Arc<CatalogClient>,
}

impl DiscoveryService {
    #[must_use]
    pub fn new(index: Arc<dyn GeoIndex>, catalog: Arc<CatalogClient>) -> Self {
        Self { index, catalog }
    }

    /// Find locations inside a radius that also match a search query.
    ///
    /// Pipeline:
    /// 1. Radius query against the geo index (at most [`NEARBY_LIMIT`] ids);
    ///    no hits answer the query right here.
    /// 2. Full-text search for the query, empty query matching everything.
    /// 3. Intersect: search ids that the radius query also returned, search
    ///    order preserved, duplicates dropped.
    /// 4. Fetch each surviving record in parallel; a failed fetch drops that
    ///    id, not the response.
    /// 5. Collapse near-duplicates (see the dedup module).
    ///
    /// Index and catalog failures degrade to an empty result with a warning
    /// rather than an error, so a search-engine outage shows an empty map
    /// instead of a broken one.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::MissingParams`] when `latitude`, `longitude`
    /// or `radius` is absent. Nothing is queried in that case.
    pub async fn discover(
        &self,
        request: &DiscoverRequest,
    ) -> Result<Vec<Location>, DiscoveryError> {
        let (latitude, longitude, radius) =
            match (request.latitude, request.longitude, request.radius) {
                (Some(lat), Some(lng), Some(radius)) => (lat, lng, radius),
                _ => return Err(DiscoveryError::MissingParams),
            };
        let query = request.search_query.as_deref().unwrap_or("");

        let center = Coordinate::new(latitude, longitude);
        let geo_ids = match self.index.nearby(center, radius, NEARBY_LIMIT) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "geo index query failed, returning no results");
                return Ok(Vec::new());
            }
        };
        if geo_ids.is_empty() {
            return Ok(Vec::new());
        }

        let page = match self.catalog.search(query, 0, SEARCH_ALL_RECORDS).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "catalog search failed, returning no results");
                return Ok(Vec::new());
            }
        };

        let in_radius: HashSet<&str> = geo_ids.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let candidates: Vec<String> = page
            .ids
            .into_iter()
            .filter(|id| in_radius.contains(id.as_str()) && seen.insert(id.clone()))
            .collect();

        let fetches = candidates.iter().map(|id| self.catalog.location_detail(id));
        let outcomes = future::join_all(fetches).await;

        let mut found = Vec::with_capacity(candidates.len());
        for (id, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                Ok(location) => found.push(location),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "detail fetch failed, dropping id");
                }
            }
        }

        tracing::debug!(
            geo_hits = geo_ids.len(),
            search_hits = seen.len(),
            returned = found.len(),
            "discovery query served"
        );

        Ok(dedup_by_longitude(found))
    }
}

#[cfg(test)]
mod tests {
    use geofind_geo::InMemoryGeoIndex;

    use super::*;

    fn service() -> DiscoveryService {
        // Port 9 refuses connections; none of these tests reach the catalog.
        let catalog = CatalogClient::with_retry_policy("http://127.0.0.1:9", 1, 0, 1)
            .expect("client construction should not fail");
        DiscoveryService::new(Arc::new(InMemoryGeoIndex::new()), Arc::new(catalog))
    }

    #[tokio::test]
    async fn missing_latitude_fails_validation() {
        let request = DiscoverRequest {
            longitude: Some(14.5),
            radius: Some(1000.0),
            ..DiscoverRequest::default()
        };
        let result = service().discover(&request).await;
        assert_eq!(result, Err(DiscoveryError::MissingParams));
    }

    #[tokio::test]
    async fn missing_radius_fails_validation() {
        let request = DiscoverRequest {
            latitude: Some(46.0),
            longitude: Some(14.5),
            ..DiscoverRequest::default()
        };
        let result = service().discover(&request).await;
        assert_eq!(result, Err(DiscoveryError::MissingParams));
    }

    #[tokio::test]
    async fn zero_values_pass_validation() {
        // 0.0 is a legitimate coordinate; only absence is invalid. The empty
        // index then yields an empty result without touching the catalog.
        let request = DiscoverRequest {
            latitude: Some(0.0),
            longitude: Some(0.0),
            radius: Some(0.0),
            search_query: None,
        };
        let result = service().discover(&request).await;
        assert_eq!(result, Ok(Vec::new()));
    }

    #[test]
    fn request_deserializes_camel_case() {
        let request: DiscoverRequest = serde_json::from_str(
            r#"{"latitude": 46.05, "longitude": 14.5, "radius": 5000, "searchQuery": "kava"}"#,
        )
        .expect("request should deserialize");
        assert_eq!(request.latitude, Some(46.05));
        assert_eq!(request.search_query.as_deref(), Some("kava"));
    }

    #[test]
    fn request_tolerates_missing_fields() {
        let request: DiscoverRequest =
            serde_json::from_str("{}").expect("empty body should deserialize");
        assert!(request.latitude.is_none());
        assert!(request.search_query.is_none());
    }
}
