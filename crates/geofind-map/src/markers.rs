//! The marker set and its selection state machine.

use geofind_core::{CoordValue, Location};

use crate::viewport::LatLng;

/// Selection state of a single marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Unselected,
    /// Pointer over the marker; drops back on leave unless selected.
    Hovered,
    /// Chosen marker, info panel open. At most one marker at a time.
    Selected,
}

/// Icon variant the surface renders for a state. Hover borrows the
/// selected icon; there is no third asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    Default,
    Selected,
}

impl MarkerState {
    #[must_use]
    pub fn icon(self) -> MarkerIcon {
        match self {
            MarkerState::Unselected => MarkerIcon::Default,
            MarkerState::Hovered | MarkerState::Selected => MarkerIcon::Selected,
        }
    }
}

/// One rendered marker and the location record it stands for.
#[derive(Debug, Clone)]
pub struct Marker {
    location: Location,
    position: LatLng,
    state: MarkerState,
}

impl Marker {
    /// Wraps a location, parsing its coordinates. Records missing either
    /// coordinate, or carrying unparseable ones, get no marker.
    fn from_location(location: Location) -> Option<Self> {
        let lat = location.lat.as_ref().and_then(CoordValue::to_f64)?;
        let lng = location.lng.as_ref().and_then(CoordValue::to_f64)?;

        Some(Self {
            location,
            position: LatLng::new(lat, lng),
            state: MarkerState::Unselected,
        })
    }

    #[must_use]
    pub fn position(&self) -> LatLng {
        self.position
    }

    #[must_use]
    pub fn state(&self) -> MarkerState {
        self.state
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// Positions are compared at five decimal places, the precision the map
/// surface itself keeps after creating a marker.
const MATCH_SCALE: f64 = 100_000.0;

#[allow(clippy::cast_possible_truncation)]
fn scaled(value: f64) -> i64 {
    (value * MATCH_SCALE).round() as i64
}

/// Owns every visible marker and enforces single selection.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: Vec<Marker>,
}

impl MarkerRegistry {
    /// Replaces the whole marker set, selection included. The caller
    /// re-renders from scratch.
    pub fn rebuild(&mut self, locations: Vec<Location>) {
        self.markers = locations
            .into_iter()
            .filter_map(Marker::from_location)
            .collect();
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Index of the marker sitting at `position`, matched at five decimal
    /// places.
    #[must_use]
    pub fn find_at(&self, position: LatLng) -> Option<usize> {
        self.markers.iter().position(|marker| {
            scaled(marker.position.lat) == scaled(position.lat)
                && scaled(marker.position.lng) == scaled(position.lng)
        })
    }

    /// Selects `index`, dropping any previous selection or hover. Returns
    /// false when the index is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.markers.len() {
            return false;
        }
        for marker in &mut self.markers {
            marker.state = MarkerState::Unselected;
        }
        self.markers[index].state = MarkerState::Selected;
        true
    }

    /// Pointer entered `index`. Returns true if the state changed;
    /// selected markers stay selected.
    pub fn pointer_enter(&mut self, index: usize) -> bool {
        match self.markers.get_mut(index) {
            Some(marker) if marker.state == MarkerState::Unselected => {
                marker.state = MarkerState::Hovered;
                true
            }
            _ => false,
        }
    }

    /// Pointer left `index`. Returns true if the state changed; hover
    /// clears, selection survives.
    pub fn pointer_leave(&mut self, index: usize) -> bool {
        match self.markers.get_mut(index) {
            Some(marker) if marker.state == MarkerState::Hovered => {
                marker.state = MarkerState::Unselected;
                true
            }
            _ => false,
        }
    }

    /// Drops selection and hover on every marker.
    pub fn clear_selection(&mut self) {
        for marker in &mut self.markers {
            marker.state = MarkerState::Unselected;
        }
    }

    /// Index of the selected marker, if any.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.markers
            .iter()
            .position(|marker| marker.state == MarkerState::Selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(lat: &str, lng: &str) -> Location {
        Location {
            lat: Some(CoordValue::from(lat)),
            lng: Some(CoordValue::from(lng)),
            ..Location::default()
        }
    }

    fn registry_with(locations: Vec<Location>) -> MarkerRegistry {
        let mut registry = MarkerRegistry::default();
        registry.rebuild(locations);
        registry
    }

    #[test]
    fn rebuild_skips_records_without_usable_coordinates() {
        let registry = registry_with(vec![
            location("46.05", "14.50"),
            Location::default(),
            location("46,06", "14,51"),
            location("unknown", "14.52"),
        ]);

        assert_eq!(registry.len(), 2);
        assert!((registry.get(1).map(Marker::position).map(|p| p.lat))
            .is_some_and(|lat| (lat - 46.06).abs() < 1e-9));
    }

    #[test]
    fn find_at_matches_at_five_decimal_places() {
        let registry = registry_with(vec![location("46.050051", "14.500049")]);

        assert_eq!(
            registry.find_at(LatLng::new(46.05005, 14.50005)),
            Some(0)
        );
        assert_eq!(registry.find_at(LatLng::new(46.05006, 14.50005)), None);
    }

    #[test]
    fn at_most_one_marker_is_selected() {
        let mut registry = registry_with(vec![
            location("46.05", "14.50"),
            location("46.06", "14.51"),
            location("46.07", "14.52"),
        ]);

        assert!(registry.select(0));
        registry.pointer_enter(1);
        assert!(registry.select(2));
        registry.pointer_enter(0);
        registry.pointer_leave(0);

        let selected: Vec<usize> = (0..registry.len())
            .filter(|&i| registry.get(i).map(Marker::state) == Some(MarkerState::Selected))
            .collect();
        assert_eq!(selected, vec![2]);
        assert_eq!(registry.selected(), Some(2));
    }

    #[test]
    fn hover_does_not_disturb_a_selected_marker() {
        let mut registry = registry_with(vec![location("46.05", "14.50")]);
        registry.select(0);

        assert!(!registry.pointer_enter(0));
        assert!(!registry.pointer_leave(0));
        assert_eq!(registry.get(0).map(Marker::state), Some(MarkerState::Selected));
    }

    #[test]
    fn pointer_leave_clears_hover_only() {
        let mut registry = registry_with(vec![
            location("46.05", "14.50"),
            location("46.06", "14.51"),
        ]);

        assert!(registry.pointer_enter(0));
        assert_eq!(registry.get(0).map(Marker::state), Some(MarkerState::Hovered));
        assert!(registry.pointer_leave(0));
        assert_eq!(
            registry.get(0).map(Marker::state),
            Some(MarkerState::Unselected)
        );
    }

    #[test]
    fn select_out_of_range_changes_nothing() {
        let mut registry = registry_with(vec![location("46.05", "14.50")]);
        registry.select(0);

        assert!(!registry.select(5));
        assert_eq!(registry.selected(), Some(0));
    }

    #[test]
    fn clear_selection_resets_every_marker() {
        let mut registry = registry_with(vec![
            location("46.05", "14.50"),
            location("46.06", "14.51"),
        ]);
        registry.select(1);
        registry.pointer_enter(0);

        registry.clear_selection();

        assert!(registry.selected().is_none());
        assert!((0..registry.len())
            .all(|i| registry.get(i).map(Marker::state) == Some(MarkerState::Unselected)));
    }
}
