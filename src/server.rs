//! HTTP Server and Metrics Collection
//!
//! This module implements the Prometheus exporter HTTP server and the collection loop.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/`, `/metrics`, `/flat`, and `/health`
//! - **Collection Loop**: Background task that runs one collection cycle per tick
//! - **State Management**: Shared state (config, metrics, client, latest set) behind Arc
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /flat` - Latest flat metric set as `name value` lines (503 when unavailable)
//! - `GET /health` - 200 if the last cycle succeeded, 503 otherwise
//!
//! # Metrics Collection
//!
//! The loop runs every N seconds (`scrape_interval_seconds`). Cycles never
//! overlap: the next tick is awaited only after the current cycle returns, and
//! a slow cycle pushes the schedule back rather than triggering a burst.
//!
//! # Error Handling
//!
//! A failed cycle is logged with the cluster name, counted by error kind, and
//! clears the exported Ceph series. The loop keeps running.

use crate::ceph::{CephClient, CommandRunner};
use crate::collectors::{self, CollectionContext};
use crate::config::{Config, MetricsConfig};
use crate::error::ExporterError;
use crate::flat::FlatMetricSet;
use crate::metrics::MetricsCollector;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    config: Config,
    metrics: MetricsCollector,
    client: Arc<CephClient>,
    latest: Arc<RwLock<Option<FlatMetricSet>>>,
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let metrics = MetricsCollector::new()?;
    let client = Arc::new(CephClient::new(config.ceph.clone()));

    let state = AppState {
        config: config.clone(),
        metrics,
        client,
        latest: Arc::new(RwLock::new(None)),
    };

    // Start background metrics collection
    let collection_state = state.clone();
    tokio::spawn(async move {
        collect_metrics_loop(collection_state).await;
    });

    // Build the router
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/flat", get(flat_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Ticker for the collection loop
///
/// A cycle that overruns the interval delays the next tick instead of being
/// followed by catch-up cycles.
pub fn collection_ticker(config: &MetricsConfig) -> Interval {
    let mut ticker = interval(Duration::from_secs(config.scrape_interval_seconds));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn collect_metrics_loop(state: AppState) {
    let mut ticker = collection_ticker(&state.config.metrics);

    loop {
        ticker.tick().await;

        let ctx = CollectionContext {
            client: state.client.as_ref(),
            config: &state.config.metrics,
        };
        let result = collectors::collect(&ctx).await;
        let published = publish_cycle(&state.metrics, ctx.client.cluster(), result);
        *state.latest.write().await = published;
    }
}

/// Apply the outcome of one cycle to the Prometheus registry
///
/// Returns the set to serve on `/flat`, or `None` when the cycle failed.
pub fn publish_cycle(
    metrics: &MetricsCollector,
    cluster: &str,
    result: Result<FlatMetricSet, ExporterError>,
) -> Option<FlatMetricSet> {
    match result {
        Ok(set) => {
            metrics.publish(&set);
            metrics.up.set(1.0);
            Some(set)
        }
        Err(e) => {
            error!("Failed to collect metrics from cluster {}: {}", cluster, e);
            metrics.reset();
            metrics.record_failure(cluster, e.kind());
            metrics.up.set(0.0);
            None
        }
    }
}

/// Run a single cycle without the HTTP server
pub async fn collect_once<R: CommandRunner>(
    client: &CephClient<R>,
    config: &Config,
) -> Result<FlatMetricSet, ExporterError> {
    let ctx = CollectionContext {
        client,
        config: &config.metrics,
    };
    collectors::collect(&ctx).await
}

async fn root_handler() -> impl IntoResponse {
    r#"<html>
<head><title>Ceph PG Exporter</title></head>
<body>
<h1>Ceph PG Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/flat">Flat metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn flat_handler(State(state): State<AppState>) -> Response {
    match state.latest.read().await.as_ref() {
        Some(set) => set.to_string().into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "No successful collection cycle",
        )
            .into_response(),
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let up_value = state.metrics.up.get();

    if up_value > 0.0 {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Ceph cluster unreachable")
    }
}
