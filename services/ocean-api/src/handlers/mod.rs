//! HTTP request handlers.

pub mod analyze;
pub mod tiles;

pub use analyze::analyze_handler;
pub use tiles::tile_handler;

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;

use crate::state::AppState;

/// Liveness probe; reports the configured layers.
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let layers: Vec<String> = state.layers.ids().iter().map(|id| id.to_string()).collect();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "ocean-api",
            "version": env!("CARGO_PKG_VERSION"),
            "layers": layers,
        })),
    )
        .into_response()
}

/// Prometheus metrics in text exposition format.
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> Response {
    (StatusCode::OK, handle.render()).into_response()
}
