//! Location discovery pipeline.
//!
//! Combines radius hits from the geo index with full-text search results
//! from the catalog: only ids present in both survive, details are fetched
//! in parallel, and near-duplicate records are collapsed. Also hosts the
//! reindex job that rebuilds the geo index from the catalog while streaming
//! progress events.

mod dedup;
pub mod error;
pub mod reindex;
pub mod service;

pub use error::DiscoveryError;
pub use reindex::ReindexEvent;
pub use service::{DiscoverRequest, DiscoveryService};
