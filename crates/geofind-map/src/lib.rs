//! Headless map controllers for location discovery.
//!
//! Everything a map page does apart from drawing: viewport debouncing and
//! radius computation, marker selection, the paged result list, the info
//! panel and the search query, driven as one event loop in
//! [`MapSession`]. Rendering goes through the [`MapSurface`] trait so the
//! same session logic runs against any map widget, or against a recording
//! double in tests.

pub mod api;
pub mod client;
pub mod config;
pub mod info;
pub mod list;
pub mod markers;
pub mod query;
pub mod session;
pub mod surface;
pub mod viewport;

pub use api::{CatalogApi, DiscoveryApi};
pub use client::{DiscoveryClient, MapClientError};
pub use config::MapConfig;
pub use info::{InfoPanel, PLACEHOLDER_IMAGE};
pub use list::{ListItem, ResultListController};
pub use markers::{Marker, MarkerIcon, MarkerRegistry, MarkerState};
pub use query::SearchQueryBuilder;
pub use session::{MapEvent, MapSession};
pub use surface::MapSurface;
pub use viewport::{Bounds, LatLng, Viewport};
