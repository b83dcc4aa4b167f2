//! Web server module.
//!
//! This module provides the axum side of the service:
//! - Receives Clerk user webhooks and applies them to the user store
//! - Verifies Svix signatures before anything is dispatched
//! - Gates every other route behind a Clerk session where required

pub mod handlers;
pub mod router;
pub mod signature;

pub use handlers::{
    clerk_webhook, current_session, health, AppState, HealthResponse, SessionResponse,
    WebhookResponse,
};
pub use router::{build_router, WEBHOOK_PATH};
pub use signature::{SignatureHeaders, SvixVerifier, Verifier, VerifyError};
