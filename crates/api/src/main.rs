//! API server entry point.

use api::config::{Config, LogFormat};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn describe_metrics() {
    metrics::describe_counter!("query_requests_total", "Query requests by route");
    metrics::describe_counter!(
        "query_search_degraded_total",
        "Searches answered empty because the index failed"
    );
    metrics::describe_counter!(
        "query_list_failed_total",
        "Listings that failed against the system of record"
    );
    metrics::describe_counter!(
        "projector_events_applied_total",
        "Change events applied to the search index"
    );
    metrics::describe_counter!(
        "projector_events_failed_total",
        "Change events that could not be applied, by error kind"
    );
    metrics::describe_counter!(
        "projector_subscribe_failed_total",
        "Failed attempts to subscribe to the change feed"
    );
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    describe_metrics();

    // 3. Connect backends and build application state
    let backends = api::backend::connect(&config)
        .await
        .expect("failed to connect backends");
    let state = api::create_state(
        backends.index.clone(),
        backends.store.clone(),
        config.gateway_config(),
    );

    // 4. Start projecting change events into the index
    let projector = api::spawn_projector(backends.index.clone(), backends.feed.clone(), &config);

    // 5. Build the application
    let app = api::create_app(state, metrics_handle);

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    projector.abort();
    drop(backends);
    tracing::info!("server shut down gracefully");
}
