//! Result list pagination state.

use geofind_core::Location;

use crate::viewport::LatLng;

/// One rendered row of the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub address_street: String,
    pub address_city: String,
    /// Absent when the record has no usable coordinates; clicking such a
    /// row cannot move the map.
    pub position: Option<LatLng>,
}

impl ListItem {
    #[must_use]
    pub fn from_location(location: &Location) -> Self {
        let position = location
            .coordinate()
            .map(|coordinate| LatLng::new(coordinate.lat, coordinate.lng));

        Self {
            id: location.id.clone().unwrap_or_default(),
            title: location.title.clone(),
            address_street: location.address_street.clone().unwrap_or_default(),
            address_city: location.address_city.clone().unwrap_or_default(),
            position,
        }
    }
}

/// Tracks how far through the full-text results the list has paged.
///
/// `rendered` counts rows the surface is showing, `total` is the match
/// count the last search reported. The load-more control shows exactly
/// while `total > rendered`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultListController {
    page_size: u64,
    offset: u64,
    rendered: u64,
    total: u64,
}

impl ResultListController {
    #[must_use]
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size,
            offset: 0,
            rendered: 0,
            total: 0,
        }
    }

    /// Records a fetched page: `hits` rows were appended, `total` is the
    /// match count reported alongside them.
    pub fn page_loaded(&mut self, hits: u64, total: u64) {
        self.rendered += hits;
        self.total = total;
    }

    /// True while more matches exist than rows rendered.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.total > self.rendered
    }

    /// Moves the offset to the next page.
    pub fn advance_offset(&mut self) {
        self.offset += self.page_size;
    }

    /// Rewinds to the first page without forgetting rendered rows.
    pub fn reset_offset(&mut self) {
        self.offset = 0;
    }

    /// Back to an empty, first-page list.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.rendered = 0;
        self.total = 0;
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}
