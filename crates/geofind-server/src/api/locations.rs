//! Location discovery endpoints.

use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};

use geofind_discovery::{DiscoverRequest, DiscoveryError, ReindexEvent};

use super::AppState;
use crate::middleware::RequestId;

/// Reply for a discovery request that cannot be used, whether the body never
/// parsed or required fields are missing.
const MISSING_PARAMS_REPLY: &str = "No proper data sent.";

/// `POST /services/locations/geo-find`
///
/// Body: `{ latitude, longitude, radius, searchQuery }`. Replies with the
/// deduplicated location records matching both the radius and the query, or
/// with a plain-text validation reply when a coordinate or the radius is
/// absent.
pub(super) async fn geo_find(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Response {
    // An unparseable body counts the same as one with the fields missing.
    let request: DiscoverRequest = serde_json::from_slice(&body).unwrap_or_default();

    match state.discovery.discover(&request).await {
        Ok(locations) => {
            tracing::debug!(
                request_id = %req_id.0,
                results = locations.len(),
                "discovery query answered"
            );
            Json(locations).into_response()
        }
        Err(DiscoveryError::MissingParams) => {
            (StatusCode::BAD_REQUEST, MISSING_PARAMS_REPLY).into_response()
        }
    }
}

/// `GET /services/locations/geo-reindex`
///
/// Rebuilds the geo index from the catalog while streaming plain-text
/// progress: one `Adding location: {title}` line per indexed record, a
/// failure line for records that could not be indexed, and a closing
/// `Total added: {n}` count.
pub(super) async fn geo_reindex(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    tracing::info!(request_id = %req_id.0, "geo reindex requested");

    let events = state.discovery.reindex();
    let stream = futures::stream::unfold(events, |mut events| async move {
        let event = events.recv().await?;
        Some((Ok::<_, Infallible>(render_event(&event)), events))
    });

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
}

/// One chunk of the reindex progress stream.
///
/// The terminal chunk starts with a blank line and carries no trailing
/// newline; clients treat `Total added:` as the end marker.
pub(super) fn render_event(event: &ReindexEvent) -> String {
    match event {
        ReindexEvent::Added { title } => format!("Adding location: {title}\n"),
        ReindexEvent::Failed { message } => format!("{message}\n"),
        ReindexEvent::Completed { total } => format!("\n\nTotal added: {total}"),
    }
}
