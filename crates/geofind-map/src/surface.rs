//! The rendering seam between the session and whatever draws the map.

use crate::info::InfoPanel;
use crate::list::ListItem;
use crate::markers::MarkerIcon;
use crate::viewport::LatLng;

/// Everything the session asks a map renderer to do.
///
/// Implementations stay dumb: they draw what they are told and feed user
/// input back as [`crate::MapEvent`]s. Camera moves requested through
/// `pan_to`/`set_zoom` are expected to come back as a
/// `MapEvent::ViewportChanged` once the renderer settles, the same as a
/// user-initiated drag.
pub trait MapSurface: Send {
    fn pan_to(&mut self, position: LatLng);
    fn set_zoom(&mut self, zoom: u8);

    fn create_marker(&mut self, index: usize, position: LatLng, icon: MarkerIcon);
    fn set_marker_icon(&mut self, index: usize, icon: MarkerIcon);
    fn remove_all_markers(&mut self);

    fn show_info(&mut self, panel: &InfoPanel);
    fn hide_info(&mut self);

    fn append_list_item(&mut self, item: &ListItem);
    fn clear_list(&mut self);

    fn show_zoom_notice(&mut self);
    fn hide_zoom_notice(&mut self);
    fn show_load_more(&mut self);
    fn hide_load_more(&mut self);
    fn show_no_results(&mut self);
    fn hide_no_results(&mut self);
}
