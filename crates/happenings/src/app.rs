use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{
        event_form::{clone_event, create, edit_event, new_event, update},
        events::{destroy, index, index_file, search, show},
        health::{healthz, livez},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/", get(index))
        .route("/events", get(index).post(create))
        .route("/{file}", get(index_file))
        .route("/events/search", get(search))
        .route("/events/new", get(new_event))
        .route(
            "/events/{id}",
            get(show).post(update).put(update).delete(destroy),
        )
        .route("/events/{id}/edit", get(edit_event))
        .route("/events/{id}/clone", get(clone_event))
        .route("/events/{id}/delete", post(destroy))
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .with_state(state)
}
