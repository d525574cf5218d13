//! HTTP Server
//!
//! This module implements the Prometheus exporter HTTP server.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **On-demand probing**: every `/metrics` request runs exactly one probe against the
//!   FreeSWITCH target; nothing is cached between scrapes
//! - **State Management**: Shared state (prober, exporter metrics) using Arc for thread-safety
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Probe results and exporter metrics in Prometheus text format
//! - `GET /health` - Liveness of the exporter process itself
//!
//! # Error Handling
//!
//! A failed probe is not an HTTP error: the response still carries `probe_success 0`
//! together with whatever the collectors emitted before the failure.

use crate::config::Config;
use crate::metrics::ExporterMetrics;
use crate::probe::Prober;
use crate::target::Target;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    metrics: ExporterMetrics,
    prober: Arc<Prober>,
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let metrics = ExporterMetrics::new()?;
    let target = Target::from_config(&config.freeswitch)?;
    let prober = Arc::new(Prober::new(target, metrics.clone()));

    let app = router(metrics, prober);

    // Start the server
    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the exporter's routes around an existing prober
pub fn router(metrics: ExporterMetrics, prober: Arc<Prober>) -> Router {
    let state = AppState { metrics, prober };

    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn root_handler() -> impl IntoResponse {
    r#"<html>
<head><title>FreeSWITCH Exporter</title></head>
<body>
<h1>FreeSWITCH Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    let mut samples = Vec::new();
    state.prober.probe(&mut samples).await;

    match state.metrics.render(&samples) {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "OK")
}
