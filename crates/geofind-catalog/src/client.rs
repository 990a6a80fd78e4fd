//! HTTP client for the catalog REST API.
//!
//! Wraps `reqwest` with typed response deserialization and retry on
//! transient failures. The catalog exposes collection reads under
//! `/api/v1/collections/locations` and full-text search under
//! `/api/v1/search`; query values are percent-encoded here and nowhere else.

use std::time::Duration;

use reqwest::{Client, Url};

use geofind_core::Location;

use crate::error::CatalogError;
use crate::retry::retry_with_backoff;
use crate::types::{CollectionList, DetailEnvelope, SearchEnvelope, SearchPage};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 250;

/// Client for the catalog REST API.
///
/// The base URL points at a concrete catalog deployment, so there is no
/// production default; tests hand in a wiremock URI.
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl CatalogClient {
    /// Creates a client with the default retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, CatalogError> {
        Self::with_retry_policy(
            base_url,
            timeout_secs,
            DEFAULT_MAX_RETRIES,
            DEFAULT_BACKOFF_BASE_MS,
        )
    }

    /// Creates a client with an explicit retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_retry_policy(
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("geofind/0.1 (location-discovery)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // relative path segments append rather than replace.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches every record in the locations collection.
    ///
    /// The envelope id is stitched onto each returned [`Location`], since
    /// payloads do not carry their own document id.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure or non-2xx HTTP status.
    /// - [`CatalogError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn list_locations(&self) -> Result<Vec<Location>, CatalogError> {
        let url = self.endpoint(&["api", "v1", "collections", "locations"]);
        let body = self.request_json(&url).await?;

        let envelope: CollectionList =
            serde_json::from_value(body).map_err(|e| CatalogError::Deserialize {
                context: "list_locations".to_string(),
                source: e,
            })?;

        Ok(envelope
            .items
            .into_iter()
            .map(|item| {
                let mut location = item.payload;
                location.id = Some(item.id);
                location
            })
            .collect())
    }

    /// Fetches a single location record by catalog document id.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure or non-2xx HTTP status
    ///   (a missing id surfaces as an HTTP 404 here).
    /// - [`CatalogError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn location_detail(&self, id: &str) -> Result<Location, CatalogError> {
        let url = self.endpoint(&["api", "v1", "collections", "locations", id]);
        let body = self.request_json(&url).await?;

        let envelope: DetailEnvelope =
            serde_json::from_value(body).map_err(|e| CatalogError::Deserialize {
                context: format!("location_detail(id={id})"),
                source: e,
            })?;

        let mut location = envelope.payload;
        location.id = Some(id.to_string());
        Ok(location)
    }

    /// Runs a full-text search and returns one page of matching ids.
    ///
    /// `query` is passed raw; percent-encoding happens here. `records` is the
    /// page size; the discovery pipeline passes a value large enough to cover
    /// the whole result set, the result list pages in smaller steps.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure or non-2xx HTTP status.
    /// - [`CatalogError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn search(
        &self,
        query: &str,
        offset: u64,
        records: u64,
    ) -> Result<SearchPage, CatalogError> {
        let mut url = self.endpoint(&["api", "v1", "search"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("offset", &offset.to_string());
            pairs.append_pair("records", &records.to_string());
        }
        let body = self.request_json(&url).await?;

        let envelope: SearchEnvelope =
            serde_json::from_value(body).map_err(|e| CatalogError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;

        Ok(SearchPage {
            total: envelope.size,
            ids: envelope
                .results
                .collections
                .into_iter()
                .map(|hit| hit.id)
                .collect(),
        })
    }

    /// Builds an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded by the `url` crate as needed, so ids with
    /// reserved characters stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Err only for cannot-be-a-base URLs, which `with_retry_policy`
        // cannot produce from an http(s) base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends a GET request with retry, asserts a 2xx status, and parses the
    /// body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] on network failure or a non-2xx status
    /// after retries are exhausted. Returns [`CatalogError::Deserialize`] if
    /// the body is not valid JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, CatalogError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
            let response = self.client.get(url.clone()).send().await?;
            let response = response.error_for_status()?;
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
                context: url.to_string(),
                source: e,
            })
        })
        .await
    }
}
