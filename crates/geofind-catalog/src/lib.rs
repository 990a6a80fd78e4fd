//! HTTP client for the catalog service.
//!
//! The catalog holds the authoritative location records and fronts the
//! full-text search engine. This crate wraps both behind a typed `reqwest`
//! client with retry on transient failures.

pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use types::SearchPage;
