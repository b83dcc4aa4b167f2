//! Webhook failure taxonomy.
//!
//! Every failure is turned into a plain-text response where it is detected.
//! The `Display` text is what the caller sees; wrapped sources only go to
//! the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::clerk::MetadataError;
use crate::users::StoreError;
use crate::web::signature::VerifyError;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Error: Missing server configuration")]
    MissingSecret,

    #[error("Error: Missing Svix headers")]
    MissingHeaders,

    #[error("Error: Invalid JSON payload")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Error: Verification error")]
    Verification(#[source] VerifyError),

    #[error("Error: Invalid event payload")]
    InvalidEvent(#[source] serde_json::Error),

    #[error("Error: Missing user ID")]
    MissingUserId,

    #[error("Error: Missing email address")]
    MissingEmail,

    #[error("Error updating user metadata")]
    Metadata(#[source] MetadataError),

    #[error("Error: User sync failed")]
    Store(#[from] StoreError),

    #[error("Unhandled event type: {0}")]
    UnhandledEventType(String),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSecret | Self::Metadata(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MissingHeaders
            | Self::InvalidJson(_)
            | Self::Verification(_)
            | Self::InvalidEvent(_)
            | Self::MissingUserId
            | Self::MissingEmail
            | Self::UnhandledEventType(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
