//! Metrics HTTP endpoint.
//!
//! Serves `/metrics` for Prometheus scraping and `/health` for probes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use kubernoisy_core::ChurnMetrics;
use tokio::net::TcpListener;
use tracing::error;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub fn build_router(metrics: Arc<ChurnMetrics>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

/// Serves `router` on `listener` until the process exits.
pub async fn serve(listener: TcpListener, router: Router) {
    if let Err(e) = axum::serve(listener, router).await {
        error!(error = %e, "metrics endpoint stopped");
    }
}

async fn health_check() -> &'static str {
    "ok"
}

/// Handler for /metrics endpoint
async fn metrics_handler(State(metrics): State<Arc<ChurnMetrics>>) -> impl IntoResponse {
    match metrics.encode_text() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_FORMAT)],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from(format!("Failed to encode metrics: {}", e)))
                .unwrap_or_default()
        }
    }
}
