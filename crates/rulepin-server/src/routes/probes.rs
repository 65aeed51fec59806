use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::state::AppState;

/// GET /healthz — 200 only while the server is up and the last cycle passed.
pub async fn healthz(State(app): State<AppState>) -> impl IntoResponse {
    if app.health.is_live() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "UNHEALTHY")
    }
}

/// GET /readyz — ready as soon as the server answers.
pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, "READY")
}
