//! HTTP client for the geofind discovery service.
//!
//! The map keeps two upstreams: the discovery service for geospatial
//! queries (this client) and the catalog for full-text paging and record
//! details (a [`geofind_catalog::CatalogClient`]). Both are used through
//! the traits in [`crate::api`] so the session can be driven by doubles.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use thiserror::Error;

use geofind_core::Location;

use crate::viewport::LatLng;

/// Errors surfaced by the map-side API clients.
#[derive(Debug, Error)]
pub enum MapClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured discovery base URL could not be parsed.
    #[error("invalid discovery base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Failure from the catalog upstream.
    #[error(transparent)]
    Catalog(#[from] geofind_catalog::CatalogError),

    /// The discovery service answered 400 with its reply body.
    #[error("discovery rejected the query: {reply}")]
    Rejected { reply: String },
}

/// Body of a discovery query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscoverBody<'a> {
    latitude: f64,
    longitude: f64,
    radius: f64,
    search_query: &'a str,
}

/// Client for the discovery service's geo-find endpoint.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    client: Client,
    base_url: Url,
}

impl DiscoveryClient {
    /// Creates a client for the discovery service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`MapClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MapClientError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, MapClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("geofind/0.1 (map client)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // relative path segments append rather than replace.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MapClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Runs a geospatial discovery query.
    ///
    /// Returns the deduplicated records inside `radius_m` of `center` that
    /// also match `query`. A 400 from the service comes back as
    /// [`MapClientError::Rejected`] carrying the service's reply text.
    ///
    /// # Errors
    ///
    /// [`MapClientError::Http`] on network failure, non-2xx statuses other
    /// than 400, or an unparseable response body.
    pub async fn discover(
        &self,
        center: LatLng,
        radius_m: f64,
        query: &str,
    ) -> Result<Vec<Location>, MapClientError> {
        let url = self.endpoint(&["services", "locations", "geo-find"]);
        let body = DiscoverBody {
            latitude: center.lat,
            longitude: center.lng,
            radius: radius_m,
            search_query: query,
        };

        let response = self.client.post(url).json(&body).send().await?;
        if response.status() == StatusCode::BAD_REQUEST {
            let reply = response.text().await?;
            return Err(MapClientError::Rejected { reply });
        }

        Ok(response.error_for_status()?.json::<Vec<Location>>().await?)
    }

    /// Builds an endpoint URL by appending path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Err only for cannot-be-a-base URLs, which `new` cannot produce
        // from an http(s) base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
