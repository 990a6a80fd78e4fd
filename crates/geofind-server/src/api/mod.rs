mod locations;

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use geofind_discovery::DiscoveryService;

use crate::middleware::{request_id, X_REQUEST_ID};

/// Shared handler state: one discovery service over the process-wide geo
/// index and catalog client.
#[derive(Clone)]
pub struct AppState {
    pub discovery: DiscoveryService,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(X_REQUEST_ID)])
}

/// Assembles the service router: healthcheck plus the two location
/// endpoints, wrapped in CORS and request-ID layers.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/services/healthcheck", get(healthcheck))
        .route("/services/locations/geo-find", post(locations::geo_find))
        .route(
            "/services/locations/geo-reindex",
            get(locations::geo_reindex),
        )
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn healthcheck() -> &'static str {
    "OK"
}
