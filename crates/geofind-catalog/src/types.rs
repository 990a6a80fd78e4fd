//! Catalog service response types.
//!
//! The catalog wraps collection reads in `{ "items": [...] }` / `{ "payload":
//! { ... } }` envelopes and search replies in `{ "size": N, "results": {
//! "collections": [...] } }`. The structs here model those shapes; only
//! [`SearchPage`] is cooked for callers.

use serde::Deserialize;

use geofind_core::Location;

/// One page of full-text search results: the total hit count reported by the
/// engine and the ids on this page, in relevance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub total: u64,
    pub ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// collection list / detail
// ---------------------------------------------------------------------------

/// Envelope for `GET /api/v1/collections/locations`.
#[derive(Debug, Deserialize)]
pub struct CollectionList {
    #[serde(default)]
    pub items: Vec<CollectionItem>,
}

/// One collection entry: the document id plus its payload.
#[derive(Debug, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    pub payload: Location,
}

/// Envelope for `GET /api/v1/collections/locations/{id}`.
#[derive(Debug, Deserialize)]
pub struct DetailEnvelope {
    pub payload: Location,
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

/// Envelope for `GET /api/v1/search`.
///
/// `results` (and `collections` inside it) may be absent when nothing
/// matches; both default to empty.
#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub results: SearchResults,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub collections: Vec<SearchHit>,
}

/// A single search hit. Only the id is consumed; scoring fields are ignored.
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub id: String,
}
