pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use rulepin_core::health::HealthState;
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the axum Router with the probe routes.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(health: Arc<HealthState>) -> Router {
    let app_state = state::AppState::new(health);

    Router::new()
        .route("/healthz", get(routes::probes::healthz))
        .route("/readyz", get(routes::probes::readyz))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serve the probe routes on a pre-bound listener until `shutdown` resolves.
///
/// If the server fails, `server_up` is cleared so that `/healthz` on any
/// surviving connection, and the `--health` client, report unhealthy.
pub async fn serve_on<F>(
    listener: tokio::net::TcpListener,
    health: Arc<HealthState>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let port = listener.local_addr()?.port();
    let app = build_router(Arc::clone(&health));

    health.set_server_up(true);
    tracing::info!("health server listening on port {port}");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;
    if let Err(e) = &result {
        health.set_server_up(false);
        tracing::error!("health server error: {e}");
    }
    result?;

    tracing::info!("health server stopped");
    Ok(())
}
