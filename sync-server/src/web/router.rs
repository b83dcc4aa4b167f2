//! Router assembly.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use super::handlers::{clerk_webhook, current_session, health, not_found, AppState};
use crate::gate::{route_gate, GateState};

pub const WEBHOOK_PATH: &str = "/api/webhooks/clerk";

/// Build the application router. `/health` is mounted outside the route
/// gate; every other route and the fallback pass through it.
pub fn build_router(state: AppState, gate: GateState, max_body_bytes: usize) -> Router {
    let gated = Router::new()
        .route(WEBHOOK_PATH, post(clerk_webhook))
        .route("/api/me", get(current_session))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(gate, route_gate));

    Router::new()
        .route("/health", get(health))
        .merge(gated)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
