//! Axum handlers for the responder routes.
//!
//! `String` and `&'static str` bodies are sent as `text/plain; charset=utf-8`.

use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::AppState;

pub const HEALTH_BODY: &str = "OK";

pub async fn health() -> &'static str {
    HEALTH_BODY
}

pub async fn version(State(state): State<AppState>) -> String {
    state.version.to_string()
}

/// Fallback for every path without a dedicated route, `/` included.
pub async fn greeting(State(state): State<AppState>) -> String {
    state.message.to_string()
}

pub async fn metrics(handle: PrometheusHandle) -> String {
    handle.render()
}
