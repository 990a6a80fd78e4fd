//! One task owning every piece of map state.
//!
//! The session receives [`MapEvent`]s from the surface, debounces camera
//! and keyboard bursts, runs fetches on spawned tasks, and pushes the
//! resulting marker, list and panel changes back through [`MapSurface`].
//! All state lives on this single task; fetch tasks only report back over
//! an internal channel, tagged with a sequence number so late responses
//! from superseded fetches are discarded instead of applied.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use geofind_core::Location;

use crate::api::{CatalogApi, DiscoveryApi};
use crate::client::MapClientError;
use crate::config::MapConfig;
use crate::info::InfoPanel;
use crate::list::{ListItem, ResultListController};
use crate::markers::{MarkerIcon, MarkerRegistry};
use crate::query::SearchQueryBuilder;
use crate::surface::MapSurface;
use crate::viewport::{LatLng, Viewport};

/// Input from the surface or the user.
#[derive(Debug, Clone)]
pub enum MapEvent {
    /// The camera settled on a new viewport. Sent for user drags and for
    /// moves the session itself requested.
    ViewportChanged(Viewport),
    /// The search field holds this text now.
    SearchInput(String),
    /// The category filter selection changed.
    FiltersChanged(Vec<String>),
    PointerEnteredMarker(usize),
    PointerLeftMarker(usize),
    MarkerClicked(usize),
    ListItemClicked(usize),
    LoadMoreClicked,
    /// The user dismissed the info panel.
    InfoClosed,
}

/// Completion report from a spawned fetch task.
enum FetchDone {
    Discover {
        seq: u64,
        result: Result<Vec<Location>, MapClientError>,
    },
    ListPage {
        seq: u64,
        result: Result<ListPage, MapClientError>,
    },
}

/// One fetched page of list rows.
///
/// `hits` counts search matches on the page, which can exceed `items` when
/// individual record fetches fail.
struct ListPage {
    total: u64,
    hits: u64,
    items: Vec<ListItem>,
}

struct PendingViewport {
    viewport: Viewport,
    deadline: Instant,
}

/// Drives one map view against the discovery service and the catalog.
pub struct MapSession<S> {
    config: MapConfig,
    surface: S,
    discovery: Arc<dyn DiscoveryApi>,
    catalog: Arc<dyn CatalogApi>,
    events: mpsc::UnboundedReceiver<MapEvent>,
    done_tx: mpsc::UnboundedSender<FetchDone>,
    done_rx: mpsc::UnboundedReceiver<FetchDone>,
    viewport: Option<Viewport>,
    pending_viewport: Option<PendingViewport>,
    pending_search: Option<Instant>,
    search_text: String,
    query: SearchQueryBuilder,
    markers: MarkerRegistry,
    list: ResultListController,
    list_items: Vec<ListItem>,
    /// Marker position to select once the next discovery round lands.
    pending_center_select: Option<LatLng>,
    discover_seq: u64,
    list_seq: u64,
}

impl<S: MapSurface> MapSession<S> {
    /// Builds a session and the sender the surface feeds events into.
    #[must_use]
    pub fn new(
        config: MapConfig,
        surface: S,
        discovery: Arc<dyn DiscoveryApi>,
        catalog: Arc<dyn CatalogApi>,
    ) -> (Self, mpsc::UnboundedSender<MapEvent>) {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let query = SearchQueryBuilder::new(&config.collection);
        let list = ResultListController::new(config.page_size);

        let session = Self {
            config,
            surface,
            discovery,
            catalog,
            events,
            done_tx,
            done_rx,
            viewport: None,
            pending_viewport: None,
            pending_search: None,
            search_text: String::new(),
            query,
            markers: MarkerRegistry::default(),
            list,
            list_items: Vec::new(),
            pending_center_select: None,
            discover_seq: 0,
            list_seq: 0,
        };

        (session, event_tx)
    }

    /// Runs until the event sender is dropped.
    pub async fn run(mut self) {
        if let Some(center) = self.config.initial_center {
            // Deep link: move there and select the marker once it exists.
            self.surface.pan_to(center);
            self.pending_center_select = Some(center);
        }
        self.start_list_fetch();

        loop {
            let viewport_deadline = self.pending_viewport.as_ref().map(|p| p.deadline);
            let search_deadline = self.pending_search;

            tokio::select! {
                event = self.events.recv() => {
                    match event {
                        Some(event) => self.on_event(event),
                        None => break,
                    }
                }
                Some(done) = self.done_rx.recv() => {
                    self.on_fetch_done(done);
                }
                () = deadline_elapsed(viewport_deadline) => {
                    if let Some(pending) = self.pending_viewport.take() {
                        self.apply_viewport(pending.viewport);
                    }
                }
                () = deadline_elapsed(search_deadline) => {
                    self.pending_search = None;
                    self.apply_search_input();
                }
            }
        }
    }

    fn on_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::ViewportChanged(viewport) => {
                self.pending_viewport = Some(PendingViewport {
                    viewport,
                    deadline: Instant::now() + self.config.viewport_debounce,
                });
            }
            MapEvent::SearchInput(text) => {
                self.search_text = text;
                self.pending_search = Some(Instant::now() + self.config.search_debounce);
            }
            MapEvent::FiltersChanged(filters) => self.apply_filters(filters),
            MapEvent::PointerEnteredMarker(index) => {
                if self.markers.pointer_enter(index) {
                    self.sync_marker_icon(index);
                }
            }
            MapEvent::PointerLeftMarker(index) => {
                if self.markers.pointer_leave(index) {
                    self.sync_marker_icon(index);
                }
            }
            MapEvent::MarkerClicked(index) => self.select_marker(index),
            MapEvent::ListItemClicked(index) => self.pan_to_list_item(index),
            MapEvent::LoadMoreClicked => self.start_list_fetch(),
            MapEvent::InfoClosed => self.close_info(),
        }
    }

    fn on_fetch_done(&mut self, done: FetchDone) {
        match done {
            FetchDone::Discover { seq, result } => self.on_discover_done(seq, result),
            FetchDone::ListPage { seq, result } => self.on_list_page_done(seq, result),
        }
    }

    /// The debounced camera position. Zoomed out past the gate the markers
    /// go away and a notice shows; otherwise a discovery round starts.
    fn apply_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);

        if viewport.zoom <= self.config.marker_gate_zoom {
            // The info panel stays open; only the markers go.
            self.surface.remove_all_markers();
            self.markers.clear();
            self.surface.show_zoom_notice();
            return;
        }

        self.surface.hide_info();
        self.markers.clear_selection();
        self.sync_all_marker_icons();
        self.surface.hide_zoom_notice();
        self.start_discover(viewport);
    }

    fn start_discover(&mut self, viewport: Viewport) {
        self.discover_seq += 1;
        let seq = self.discover_seq;
        let discovery = Arc::clone(&self.discovery);
        let query = self.query.build();
        let center = viewport.center;
        let radius_m = viewport.search_radius_m();
        let done_tx = self.done_tx.clone();

        tokio::spawn(async move {
            let result = discovery.discover(center, radius_m, &query).await;
            let _ = done_tx.send(FetchDone::Discover { seq, result });
        });
    }

    fn start_list_fetch(&mut self) {
        self.surface.hide_no_results();
        self.list_seq += 1;
        let seq = self.list_seq;
        let catalog = Arc::clone(&self.catalog);
        let query = self.query.build();
        let offset = self.list.offset();
        let records = self.config.page_size;
        let done_tx = self.done_tx.clone();

        tokio::spawn(async move {
            let result = fetch_list_page(catalog.as_ref(), &query, offset, records).await;
            let _ = done_tx.send(FetchDone::ListPage { seq, result });
        });
    }

    fn on_discover_done(&mut self, seq: u64, result: Result<Vec<Location>, MapClientError>) {
        if seq != self.discover_seq {
            tracing::debug!(seq, "stale discovery response discarded");
            return;
        }

        let locations = match result {
            Ok(locations) => locations,
            Err(error) => {
                tracing::warn!(%error, "discovery fetch failed, keeping current markers");
                return;
            }
        };

        self.surface.remove_all_markers();
        self.markers.rebuild(locations);

        let placements: Vec<(LatLng, MarkerIcon)> = self
            .markers
            .iter()
            .map(|marker| (marker.position(), marker.state().icon()))
            .collect();
        for (index, (position, icon)) in placements.into_iter().enumerate() {
            self.surface.create_marker(index, position, icon);
        }

        if let Some(center) = self.pending_center_select.take() {
            match self.markers.find_at(center) {
                Some(index) => self.select_marker(index),
                None => {
                    tracing::debug!("no marker at the requested centre, selection dropped");
                }
            }
        }
    }

    fn on_list_page_done(&mut self, seq: u64, result: Result<ListPage, MapClientError>) {
        if seq != self.list_seq {
            tracing::debug!(seq, "stale list page discarded");
            return;
        }

        let page = match result {
            Ok(page) => page,
            Err(error) => {
                tracing::warn!(%error, "list fetch failed, keeping current rows");
                return;
            }
        };

        if page.hits == 0 {
            self.surface.show_no_results();
            self.surface.hide_load_more();
            self.list.reset_offset();
            return;
        }

        for item in &page.items {
            self.surface.append_list_item(item);
        }
        self.list_items.extend(page.items);
        self.list.page_loaded(page.hits, page.total);

        if self.list.has_more() {
            self.list.advance_offset();
            self.surface.show_load_more();
        } else {
            self.list.reset_offset();
            self.surface.hide_load_more();
        }
    }

    fn select_marker(&mut self, index: usize) {
        if !self.markers.select(index) {
            return;
        }
        self.sync_all_marker_icons();

        if let Some(marker) = self.markers.get(index) {
            let panel = InfoPanel::from_location(marker.location());
            self.surface.show_info(&panel);
        }
    }

    fn close_info(&mut self) {
        self.surface.hide_info();
        self.markers.clear_selection();
        self.sync_all_marker_icons();
    }

    /// Zooms in on the clicked row's position. The camera move comes back
    /// as a viewport change, and the discovery round it triggers selects
    /// the marker standing there.
    fn pan_to_list_item(&mut self, index: usize) {
        let Some(position) = self.list_items.get(index).and_then(|item| item.position) else {
            return;
        };

        self.pending_center_select = Some(position);
        self.surface.set_zoom(self.config.initial_zoom);
        self.surface.pan_to(position);
    }

    fn apply_filters(&mut self, filters: Vec<String>) {
        self.query.set_input(&self.search_text);
        self.query.set_filters(filters);
        self.restart_list();
        self.requeue_viewport();
    }

    /// The debounced search input. An empty field lists everything; short
    /// non-empty input changes nothing.
    fn apply_search_input(&mut self) {
        self.surface.hide_no_results();
        self.surface.hide_load_more();
        self.list.reset_offset();

        let chars = self.search_text.chars().count();
        if chars != 0 && chars < self.config.query_min_length {
            return;
        }

        self.query.set_input(&self.search_text);
        self.restart_list();
        self.requeue_viewport();
    }

    /// Throws the rendered list away and fetches the first page of the
    /// current query.
    fn restart_list(&mut self) {
        self.surface.hide_load_more();
        self.surface.clear_list();
        self.list_items.clear();
        self.list.reset();
        self.start_list_fetch();
    }

    /// Schedules a marker refresh for the current viewport, as if the
    /// camera had just moved.
    fn requeue_viewport(&mut self) {
        if let Some(viewport) = self.viewport {
            self.pending_viewport = Some(PendingViewport {
                viewport,
                deadline: Instant::now() + self.config.viewport_debounce,
            });
        }
    }

    fn sync_marker_icon(&mut self, index: usize) {
        if let Some(marker) = self.markers.get(index) {
            let icon = marker.state().icon();
            self.surface.set_marker_icon(index, icon);
        }
    }

    fn sync_all_marker_icons(&mut self) {
        let icons: Vec<MarkerIcon> = self
            .markers
            .iter()
            .map(|marker| marker.state().icon())
            .collect();
        for (index, icon) in icons.into_iter().enumerate() {
            self.surface.set_marker_icon(index, icon);
        }
    }
}

/// Resolves at `deadline`; pends forever when there is none.
async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Searches one page of ids, then fetches every record on it.
///
/// A record fetch failure drops that row and keeps the rest; the search
/// hit still counts toward pagination, matching what the result total
/// reported.
async fn fetch_list_page(
    catalog: &dyn CatalogApi,
    query: &str,
    offset: u64,
    records: u64,
) -> Result<ListPage, MapClientError> {
    let page = catalog.search(query, offset, records).await?;
    let hits = page.ids.len() as u64;

    let details =
        futures::future::join_all(page.ids.iter().map(|id| catalog.location_detail(id))).await;

    let mut items = Vec::with_capacity(details.len());
    for (id, detail) in page.ids.iter().zip(details) {
        match detail {
            Ok(location) => items.push(ListItem::from_location(&location)),
            Err(error) => {
                tracing::warn!(%id, %error, "record fetch failed, leaving it off the list");
            }
        }
    }

    Ok(ListPage {
        total: page.total,
        hits,
        items,
    })
}
