//! Integration tests for the discovery pipeline and the reindex job,
//! running against a wiremock catalog.

use std::sync::Arc;

use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geofind_catalog::CatalogClient;
use geofind_core::{Coordinate, Location};
use geofind_discovery::{DiscoverRequest, DiscoveryError, DiscoveryService, ReindexEvent};
use geofind_geo::{GeoIndex, InMemoryGeoIndex};

const CENTER: (f64, f64) = (46.0504, 14.50607);

fn catalog_client(server: &MockServer) -> Arc<CatalogClient> {
    // Retries off so failure-path tests resolve immediately.
    let client = CatalogClient::with_retry_policy(&server.uri(), 30, 0, 1)
        .expect("client construction should not fail");
    Arc::new(client)
}

fn indexed(points: &[(&str, f64, f64)]) -> Arc<InMemoryGeoIndex> {
    let index = Arc::new(InMemoryGeoIndex::new());
    for (id, lat, lng) in points {
        index
            .insert(id, Coordinate::new(*lat, *lng))
            .expect("test coordinates are valid");
    }
    index
}

fn request(radius: f64, query: &str) -> DiscoverRequest {
    DiscoverRequest {
        latitude: Some(CENTER.0),
        longitude: Some(CENTER.1),
        radius: Some(radius),
        search_query: Some(query.to_string()),
    }
}

fn titles(locations: &[Location]) -> Vec<&str> {
    locations.iter().map(|l| l.title.as_str()).collect()
}

async fn mount_search(server: &MockServer, ids: &[&str]) {
    let collections: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({ "id": id }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "size": ids.len(),
            "results": { "collections": collections }
        })))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, title: &str, lat: f64, lng: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/collections/locations/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payload": { "lat": lat, "lng": lng, "title": title }
        })))
        .mount(server)
        .await;
}

async fn collect_events(mut rx: mpsc::Receiver<ReindexEvent>) -> Vec<ReindexEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

// ---------------------------------------------------------------------------
// discover
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_params_touch_neither_index_nor_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = DiscoveryService::new(
        indexed(&[("a", CENTER.0, CENTER.1)]),
        catalog_client(&server),
    );

    let incomplete = DiscoverRequest {
        longitude: Some(CENTER.1),
        radius: Some(1000.0),
        ..DiscoverRequest::default()
    };
    let result = service.discover(&incomplete).await;
    assert_eq!(result, Err(DiscoveryError::MissingParams));
}

#[tokio::test]
async fn no_geo_hits_skip_the_search_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = DiscoveryService::new(indexed(&[("far", 47.0, 15.5)]), catalog_client(&server));

    let found = service
        .discover(&request(1_000.0, "locations"))
        .await
        .expect("discover should succeed");
    assert!(found.is_empty());
}

#[tokio::test]
async fn returns_intersection_in_search_order() {
    let server = MockServer::start().await;

    // Geo index knows a, b, c near the center; search matched d, c, b.
    // Only c and b survive, in search order.
    mount_search(&server, &["d", "c", "b"]).await;
    mount_detail(&server, "c", "Cafe C", 46.051, 14.507).await;
    mount_detail(&server, "b", "Bar B", 46.052, 14.508).await;

    let service = DiscoveryService::new(
        indexed(&[
            ("a", 46.0505, 14.5061),
            ("b", 46.0520, 14.5080),
            ("c", 46.0510, 14.5070),
        ]),
        catalog_client(&server),
    );

    let found = service
        .discover(&request(5_000.0, "locations"))
        .await
        .expect("discover should succeed");
    assert_eq!(titles(&found), vec!["Cafe C", "Bar B"]);
}

#[tokio::test]
async fn ids_outside_the_radius_are_never_fetched() {
    let server = MockServer::start().await;

    mount_search(&server, &["near", "far"]).await;
    mount_detail(&server, "near", "Near", 46.051, 14.507).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collections/locations/far"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = DiscoveryService::new(
        indexed(&[("near", 46.0510, 14.5070), ("far", 47.0, 15.5)]),
        catalog_client(&server),
    );

    let found = service
        .discover(&request(5_000.0, ""))
        .await
        .expect("discover should succeed");
    assert_eq!(titles(&found), vec!["Near"]);
}

#[tokio::test]
async fn duplicate_search_ids_are_fetched_once() {
    let server = MockServer::start().await;

    mount_search(&server, &["b", "b", "b"]).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collections/locations/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payload": { "lat": 46.052, "lng": 14.508, "title": "Bar B" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service =
        DiscoveryService::new(indexed(&[("b", 46.0520, 14.5080)]), catalog_client(&server));

    let found = service
        .discover(&request(5_000.0, ""))
        .await
        .expect("discover should succeed");
    assert_eq!(titles(&found), vec!["Bar B"]);
}

#[tokio::test]
async fn failed_detail_fetch_drops_only_that_id() {
    let server = MockServer::start().await;

    mount_search(&server, &["b", "c"]).await;
    mount_detail(&server, "b", "Bar B", 46.052, 14.508).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collections/locations/c"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = DiscoveryService::new(
        indexed(&[("b", 46.0520, 14.5080), ("c", 46.0510, 14.5070)]),
        catalog_client(&server),
    );

    let found = service
        .discover(&request(5_000.0, ""))
        .await
        .expect("discover should succeed");
    assert_eq!(titles(&found), vec!["Bar B"]);
}

#[tokio::test]
async fn search_outage_degrades_to_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service =
        DiscoveryService::new(indexed(&[("a", CENTER.0, CENTER.1)]), catalog_client(&server));

    let found = service
        .discover(&request(5_000.0, ""))
        .await
        .expect("degrade, not error");
    assert!(found.is_empty());
}

#[tokio::test]
async fn near_duplicates_collapse_on_longitude() {
    let server = MockServer::start().await;

    mount_search(&server, &["b", "c"]).await;
    // Same longitude, different latitude: copy-paste twins.
    mount_detail(&server, "b", "Original", 46.052, 14.508).await;
    mount_detail(&server, "c", "Copy", 46.060, 14.508).await;

    let service = DiscoveryService::new(
        indexed(&[("b", 46.0520, 14.5080), ("c", 46.0600, 14.5080)]),
        catalog_client(&server),
    );

    let found = service
        .discover(&request(5_000.0, ""))
        .await
        .expect("discover should succeed");
    assert_eq!(titles(&found), vec!["Original"]);
}

#[tokio::test]
async fn search_query_is_forwarded_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("q", "locations kava*"))
        .and(query_param("offset", "0"))
        .and(query_param("records", "10000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "size": 0,
            "results": { "collections": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service =
        DiscoveryService::new(indexed(&[("a", CENTER.0, CENTER.1)]), catalog_client(&server));

    let found = service
        .discover(&request(5_000.0, "locations kava*"))
        .await
        .expect("discover should succeed");
    assert!(found.is_empty());
}

// ---------------------------------------------------------------------------
// reindex
// ---------------------------------------------------------------------------

async fn mount_list(server: &MockServer, items: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/collections/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": items
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn reindex_streams_adds_in_catalog_order_then_completes() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        serde_json::json!([
            { "id": "a", "payload": { "lat": 46.05, "lng": 14.50, "title": "First" } },
            { "id": "b", "payload": { "lat": "46,06", "lng": "14.51", "title": "Second" } },
            { "id": "c", "payload": { "lat": 46.07, "lng": 14.52, "title": "Third" } }
        ]),
    )
    .await;

    let index = Arc::new(InMemoryGeoIndex::new());
    let service = DiscoveryService::new(index.clone(), catalog_client(&server));

    let events = collect_events(service.reindex()).await;
    assert_eq!(
        events,
        vec![
            ReindexEvent::Added {
                title: "First".to_string()
            },
            ReindexEvent::Added {
                title: "Second".to_string()
            },
            ReindexEvent::Added {
                title: "Third".to_string()
            },
            ReindexEvent::Completed { total: 3 },
        ]
    );
    assert_eq!(index.len().expect("len"), 3);

    // Comma-separated coordinates landed as proper positions.
    let hits = index
        .nearby(Coordinate::new(46.06, 14.51), 100.0, 10)
        .expect("nearby");
    assert_eq!(hits, vec!["b".to_string()]);
}

#[tokio::test]
async fn reindex_skips_records_without_coordinates() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        serde_json::json!([
            { "id": "a", "payload": { "lat": 46.05, "lng": 14.50, "title": "Placed" } },
            { "id": "b", "payload": { "title": "Awaiting geocoding" } },
            { "id": "c", "payload": { "lat": 46.07, "lng": 14.52, "title": "Also placed" } }
        ]),
    )
    .await;

    let index = Arc::new(InMemoryGeoIndex::new());
    let service = DiscoveryService::new(index.clone(), catalog_client(&server));

    let events = collect_events(service.reindex()).await;
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, ReindexEvent::Failed { .. })),
        "missing coordinates are not a failure: {events:?}"
    );
    assert_eq!(events.last(), Some(&ReindexEvent::Completed { total: 2 }));
    assert_eq!(index.len().expect("len"), 2);

    let near_missing = index
        .nearby(Coordinate::new(46.06, 14.51), 500_000.0, 10)
        .expect("nearby");
    assert!(!near_missing.contains(&"b".to_string()));
}

#[tokio::test]
async fn reindex_reports_unparseable_coordinates() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        serde_json::json!([
            { "id": "a", "payload": { "lat": "behind the station", "lng": 14.50, "title": "Vague" } },
            { "id": "b", "payload": { "lat": 46.06, "lng": 14.51, "title": "Precise" } }
        ]),
    )
    .await;

    let index = Arc::new(InMemoryGeoIndex::new());
    let service = DiscoveryService::new(index.clone(), catalog_client(&server));

    let events = collect_events(service.reindex()).await;
    assert_eq!(events.len(), 3);
    assert!(
        matches!(&events[0], ReindexEvent::Failed { message } if message.contains("Vague")),
        "expected a Failed event naming the record, got: {:?}",
        events[0]
    );
    assert_eq!(
        events[1],
        ReindexEvent::Added {
            title: "Precise".to_string()
        }
    );
    assert_eq!(events[2], ReindexEvent::Completed { total: 1 });
    assert_eq!(index.len().expect("len"), 1);
}

#[tokio::test]
async fn reindex_reports_out_of_range_coordinates() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        serde_json::json!([
            { "id": "a", "payload": { "lat": 95.0, "lng": 14.50, "title": "Off the map" } }
        ]),
    )
    .await;

    let service = DiscoveryService::new(Arc::new(InMemoryGeoIndex::new()), catalog_client(&server));

    let events = collect_events(service.reindex()).await;
    assert!(
        matches!(&events[0], ReindexEvent::Failed { message } if message.contains("invalid coordinate")),
        "got: {:?}",
        events[0]
    );
    assert_eq!(events.last(), Some(&ReindexEvent::Completed { total: 0 }));
}

#[tokio::test]
async fn reindex_replaces_previous_contents() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        serde_json::json!([
            { "id": "fresh", "payload": { "lat": 46.05, "lng": 14.50, "title": "Fresh" } }
        ]),
    )
    .await;

    let index = indexed(&[("stale", 46.05, 14.50)]);
    let service = DiscoveryService::new(index.clone(), catalog_client(&server));

    let events = collect_events(service.reindex()).await;
    assert_eq!(events.last(), Some(&ReindexEvent::Completed { total: 1 }));

    let hits = index
        .nearby(Coordinate::new(46.05, 14.50), 1_000.0, 10)
        .expect("nearby");
    assert_eq!(hits, vec!["fresh".to_string()], "stale entry must be gone");
}

#[tokio::test]
async fn reindex_catalog_outage_keeps_previous_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collections/locations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let index = indexed(&[("survivor", 46.05, 14.50)]);
    let service = DiscoveryService::new(index.clone(), catalog_client(&server));

    let events = collect_events(service.reindex()).await;
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ReindexEvent::Failed { .. }));
    assert_eq!(events[1], ReindexEvent::Completed { total: 0 });

    let hits = index
        .nearby(Coordinate::new(46.05, 14.50), 1_000.0, 10)
        .expect("nearby");
    assert_eq!(
        hits,
        vec!["survivor".to_string()],
        "a dead catalog must not wipe the index"
    );
}
