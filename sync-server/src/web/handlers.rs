//! HTTP endpoint handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::WebhookError;
use crate::gate::SessionClaims;
use crate::users::User;
use crate::webhook::WebhookReceiver;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub receiver: Arc<WebhookReceiver>,
}

impl AppState {
    pub fn new(receiver: WebhookReceiver) -> Self {
        Self {
            receiver: Arc::new(receiver),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Clerk Webhook
// =============================================================================

/// Webhook success envelope.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub message: &'static str,
    pub user: Option<User>,
}

/// Clerk user webhook endpoint.
///
/// The body is taken as raw bytes: the signature covers the exact bytes
/// Svix sent, so it must be verified before any re-serialization.
pub async fn clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    info!(
        body_length = body.len(),
        svix_id = headers.get("svix-id").and_then(|v| v.to_str().ok()).unwrap_or(""),
        "clerk_webhook_received"
    );

    let user = state.receiver.receive(&headers, &body).await?;

    Ok(Json(WebhookResponse { message: "OK", user }))
}

// =============================================================================
// Session
// =============================================================================

/// The signed-in user as seen by the route gate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub session_id: Option<String>,
}

/// Echo the session attached by the route gate.
pub async fn current_session(
    claims: Option<Extension<SessionClaims>>,
) -> Result<Json<SessionResponse>, StatusCode> {
    let Extension(claims) = claims.ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(Json(SessionResponse {
        user_id: claims.sub,
        session_id: claims.sid,
    }))
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
