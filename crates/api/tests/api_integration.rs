//! Integration tests for the API server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use api::backend::InMemoryBackends;
use api::config::Config;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use common::Meow;
use event_feed::{ChangeEvent, ChannelFeed, EventFeed, EventStream, FeedError};
use meow_store::{MeowStore, StoreError};
use metrics_exporter_prometheus::PrometheusHandle;
use query::GatewayConfig;
use search_index::{IndexError, SearchIndex};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Index and store that are always down.
struct Unavailable;

#[async_trait]
impl SearchIndex for Unavailable {
    async fn upsert(&self, _meow: &Meow) -> search_index::Result<()> {
        Err(IndexError::Unavailable("connection refused".into()))
    }

    async fn query(&self, _: &str, _: u64, _: u64) -> search_index::Result<Vec<Meow>> {
        Err(IndexError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl MeowStore for Unavailable {
    async fn list_by_created_at(&self, _: u64, _: u64) -> meow_store::Result<Vec<Meow>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

fn meow(id: &str, body: &str, minute: i64) -> Meow {
    let base = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap();
    Meow::new(id, body, base + ChronoDuration::minutes(minute))
}

async fn setup() -> (axum::Router, InMemoryBackends) {
    let (state, backends) = api::create_default_state(GatewayConfig::default());
    for record in [
        meow("a", "sunbeam on the carpet", 1),
        meow("b", "relevant text matching b", 2),
        meow("c", "the red dot escaped again", 3),
    ] {
        backends.index.upsert(&record).await.unwrap();
        backends.store.insert(record).await;
    }
    (api::create_app(state, get_metrics_handle()), backends)
}

fn setup_unavailable() -> axum::Router {
    let state = api::create_state(
        Arc::new(Unavailable),
        Arc::new(Unavailable),
        GatewayConfig::default(),
    );
    api::create_app(state, get_metrics_handle())
}

/// Refuses the first `failures` subscriptions as unavailable.
struct FlakyFeed {
    inner: ChannelFeed,
    failures: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl EventFeed for FlakyFeed {
    async fn subscribe(&self) -> event_feed::Result<EventStream> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(FeedError::Closed);
        }
        self.inner.subscribe().await
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    assert_eq!(
        response.headers()["content-type"],
        "application/json",
        "every response to {uri} is JSON"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn ids(json: &serde_json::Value) -> Vec<&str> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup().await;

    let (status, json) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_search_ranks_matches() {
    let (app, _) = setup().await;

    let (status, json) = get(app, "/search?query=relevant%20text%20matching%20b").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json).first(), Some(&"b"));
    assert_eq!(json[0]["body"], "relevant text matching b");
    assert!(json[0]["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_search_without_query_is_bad_request() {
    let (app, _) = setup().await;

    let (status, json) = get(app.clone(), "/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing query parameter");

    let (status, json) = get(app, "/search?query=&take=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing query parameter");
}

#[tokio::test]
async fn test_search_rejects_malformed_pagination() {
    let (app, _) = setup().await;

    let (status, json) = get(app.clone(), "/search?query=red&skip=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid skip parameter");

    let (status, json) = get(app, "/search?query=red&take=many").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid take parameter");
}

#[tokio::test]
async fn test_search_degrades_when_index_is_down() {
    let app = setup_unavailable();

    let (status, json) = get(app, "/search?query=tuna").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_is_chronological() {
    let (app, _) = setup().await;

    let (status, json) = get(app.clone(), "/meows?skip=0&take=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["a", "b"]);

    let (status, json) = get(app, "/meows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_list_rejects_malformed_take() {
    let (app, _) = setup().await;

    let (status, json) = get(app, "/meows?take=1.5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid take parameter");
}

#[tokio::test]
async fn test_list_fails_visibly_when_store_is_down() {
    let app = setup_unavailable();

    let (status, json) = get(app, "/meows").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, serde_json::json!({ "error": "Could not fetch meows" }));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup().await;
    let _ = get(app.clone(), "/meows").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("query_requests_total"));
}

#[tokio::test]
async fn test_published_events_become_searchable() {
    let (state, backends) = api::create_default_state(GatewayConfig::default());
    let app = api::create_app(state, get_metrics_handle());
    let projector = api::spawn_projector(
        backends.index.clone(),
        backends.feed.clone(),
        &Config::default(),
    );

    backends
        .publisher
        .publish(ChangeEvent::created(meow("z", "zoomies at midnight", 1)))
        .await
        .unwrap();

    let mut found = Vec::new();
    for _ in 0..50 {
        let (_, json) = get(app.clone(), "/search?query=zoomies").await;
        found = ids(&json).into_iter().map(String::from).collect();
        if !found.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(found, vec!["z"]);

    drop(backends);
    let stats = projector.await.unwrap();
    assert_eq!(stats.applied, 1);
}

#[tokio::test]
async fn test_repeated_query_keys_keep_first_value() {
    let (app, _) = setup().await;

    let (status, json) = get(app.clone(), "/search?query=relevant&query=sunbeam").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["b"]);

    let (status, json) = get(app.clone(), "/meows?take=2&take=abc&skip=1&skip=-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["b", "c"]);

    let (status, json) = get(app, "/meows?take=abc&take=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid take parameter");
}

#[tokio::test(start_paused = true)]
async fn test_projector_resubscribes_after_failed_subscription() {
    let index = Arc::new(search_index::InMemorySearchIndex::new());
    let (publisher, inner) = ChannelFeed::new(8);
    let feed = Arc::new(FlakyFeed {
        inner,
        failures: 2,
        calls: AtomicUsize::new(0),
    });

    let projector = api::spawn_projector(index.clone(), feed.clone(), &Config::default());
    publisher
        .publish(ChangeEvent::created(meow("late", "still indexed after retries", 1)))
        .await
        .unwrap();
    drop(publisher);

    let stats = projector.await.unwrap();
    assert_eq!(stats.applied, 1);
    assert_eq!(feed.calls.load(Ordering::SeqCst), 3);
    assert_eq!(index.len().await, 1);
}
