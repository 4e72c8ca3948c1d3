//! HTTP API server with observability for the meow query service.
//!
//! Serves ranked search and chronological listing over REST while a background
//! task projects change events into the search index, with structured logging
//! (tracing) and Prometheus metrics.

pub mod backend;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use event_feed::EventFeed;
use meow_store::MeowStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{MeowProjector, ProcessorStats, ProjectionProcessor};
use query::{GatewayConfig, QueryGateway};
use search_index::SearchIndex;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use backend::InMemoryBackends;
use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub gateway: QueryGateway,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/search", get(routes::search::search))
        .route("/meows", get(routes::meows::list))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the given index and store.
pub fn create_state(
    index: Arc<dyn SearchIndex>,
    store: Arc<dyn MeowStore>,
    config: GatewayConfig,
) -> Arc<AppState> {
    Arc::new(AppState {
        gateway: QueryGateway::with_config(index, store, config),
    })
}

/// Creates state over fresh in-memory backends, returned for seeding.
pub fn create_default_state(config: GatewayConfig) -> (Arc<AppState>, InMemoryBackends) {
    let backends = InMemoryBackends::new();
    let state = create_state(backends.index.clone(), backends.store.clone(), config);
    (state, backends)
}

/// Spawns the projection loop: feed → projector → index.
///
/// Subscription failures on an unavailable backend are retried until the
/// task is aborted. The task ends when the feed ends or refuses the
/// subscription outright.
pub fn spawn_projector(
    index: Arc<dyn SearchIndex>,
    feed: Arc<dyn EventFeed>,
    config: &Config,
) -> JoinHandle<ProcessorStats> {
    let projector = MeowProjector::with_timeout(index, config.backend_timeout);
    let processor = ProjectionProcessor::new(Arc::new(projector))
        .with_concurrency(config.projector_concurrency);

    tokio::spawn(async move { processor.run_feed_with_retry(feed.as_ref()).await })
}
