//! Trait seams over the two remote APIs the session talks to.

use async_trait::async_trait;
use geofind_catalog::{CatalogClient, SearchPage};
use geofind_core::Location;

use crate::client::{DiscoveryClient, MapClientError};
use crate::viewport::LatLng;

/// Geospatial discovery, answered by the geofind server.
#[async_trait]
pub trait DiscoveryApi: Send + Sync {
    async fn discover(
        &self,
        center: LatLng,
        radius_m: f64,
        query: &str,
    ) -> Result<Vec<Location>, MapClientError>;
}

/// Full-text search plus record lookup, answered by the catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn search(
        &self,
        query: &str,
        offset: u64,
        records: u64,
    ) -> Result<SearchPage, MapClientError>;

    async fn location_detail(&self, id: &str) -> Result<Location, MapClientError>;
}

#[async_trait]
impl DiscoveryApi for DiscoveryClient {
    async fn discover(
        &self,
        center: LatLng,
        radius_m: f64,
        query: &str,
    ) -> Result<Vec<Location>, MapClientError> {
        DiscoveryClient::discover(self, center, radius_m, query).await
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn search(
        &self,
        query: &str,
        offset: u64,
        records: u64,
    ) -> Result<SearchPage, MapClientError> {
        Ok(CatalogClient::search(self, query, offset, records).await?)
    }

    async fn location_detail(&self, id: &str) -> Result<Location, MapClientError> {
        Ok(CatalogClient::location_detail(self, id).await?)
    }
}
