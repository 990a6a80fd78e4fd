//! Map behaviour configuration.

use std::time::Duration;

use crate::viewport::LatLng;

/// Tunables for a [`MapSession`](crate::session::MapSession), mirroring the
/// page-level map setup.
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Zoom applied when panning to a chosen location.
    pub initial_zoom: u8,
    /// Lowest zoom the surface allows.
    pub min_zoom: u8,
    /// At or below this zoom no markers are fetched and a notice shows.
    pub marker_gate_zoom: u8,
    /// Quiet period after the last camera move before markers refresh.
    pub viewport_debounce: Duration,
    /// Quiet period after the last keystroke before the list refreshes.
    pub search_debounce: Duration,
    /// Result list page size.
    pub page_size: u64,
    /// Non-empty queries shorter than this leave the list untouched.
    pub query_min_length: usize,
    /// Collection name prefixed to every search query.
    pub collection: String,
    /// Where the camera starts.
    pub default_center: LatLng,
    /// Deep-linked centre: pan here on startup and select the matching
    /// marker once the first discovery round lands.
    pub initial_center: Option<LatLng>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_zoom: 16,
            min_zoom: 11,
            marker_gate_zoom: 15,
            viewport_debounce: Duration::from_millis(500),
            search_debounce: Duration::from_millis(300),
            page_size: 18,
            query_min_length: 2,
            collection: "locations".to_string(),
            default_center: LatLng::new(46.0504, 14.50607),
            initial_center: None,
        }
    }
}
