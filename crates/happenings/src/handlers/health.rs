//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Storage and cache stats

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately. Used to check if the server is accepting connections.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Storage reachability and cache stats.
///
/// Returns 503 when the event repository cannot be read.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Response {
    match state.event_repo.list_events().await {
        Ok(events) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "healthy": true,
                "events": events.len(),
                "cached_listings": state.listing_cache.len().await,
            })),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "healthy": false,
                    "error": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}
