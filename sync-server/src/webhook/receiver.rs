//! Verify-then-dispatch flow for Clerk user webhooks.

use std::sync::Arc;

use axum::http::HeaderMap;
use serde_json::json;
use tracing::{error, info, warn};

use crate::clerk::IdentityMetadataUpdater;
use crate::error::WebhookError;
use crate::users::{User, UserStore};
use crate::web::signature::{SignatureHeaders, Verifier};

use super::event::{EventKind, WebhookEvent};

/// Handles one webhook delivery at a time; holds no per-request state.
///
/// Deliveries are not deduplicated by `svix-id`: a redelivered event runs
/// its side effect again.
pub struct WebhookReceiver {
    signing_secret: Option<String>,
    verifier: Arc<dyn Verifier>,
    users: Arc<dyn UserStore>,
    metadata: Arc<dyn IdentityMetadataUpdater>,
}

impl WebhookReceiver {
    pub fn new(
        signing_secret: Option<String>,
        verifier: Arc<dyn Verifier>,
        users: Arc<dyn UserStore>,
        metadata: Arc<dyn IdentityMetadataUpdater>,
    ) -> Self {
        Self {
            signing_secret: signing_secret.filter(|s| !s.trim().is_empty()),
            verifier,
            users,
            metadata,
        }
    }

    /// Verify a delivery and apply it to the user store.
    ///
    /// Returns the user row the store handed back, if any.
    pub async fn receive(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Option<User>, WebhookError> {
        let secret = self.signing_secret.as_deref().ok_or_else(|| {
            error!("webhook_signing_secret_missing");
            WebhookError::MissingSecret
        })?;

        let signature = SignatureHeaders::from_headers(headers).ok_or_else(|| {
            warn!("webhook_svix_headers_missing");
            WebhookError::MissingHeaders
        })?;

        let payload: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, body_length = body.len(), "webhook_invalid_json");
            WebhookError::InvalidJson(e)
        })?;

        self.verifier
            .verify(secret, &signature, body)
            .map_err(|e| {
                warn!(svix_id = %signature.id, reason = %e, "webhook_verification_failed");
                WebhookError::Verification(e)
            })?;

        let event: WebhookEvent = serde_json::from_value(payload).map_err(|e| {
            warn!(svix_id = %signature.id, error = %e, "webhook_invalid_event");
            WebhookError::InvalidEvent(e)
        })?;

        let clerk_id = event.user_id().ok_or_else(|| {
            warn!(svix_id = %signature.id, event_type = %event.event_type, "webhook_missing_user_id");
            WebhookError::MissingUserId
        })?;

        info!(
            svix_id = %signature.id,
            event_type = %event.event_type,
            clerk_id = %clerk_id,
            "webhook_event_verified"
        );

        match event.kind() {
            EventKind::UserCreated => self.user_created(&event, clerk_id).await,
            EventKind::UserUpdated => self.user_updated(&event, clerk_id).await,
            EventKind::UserDeleted => self.user_deleted(clerk_id).await,
            EventKind::Unknown(event_type) => {
                warn!(event_type = %event_type, "webhook_unhandled_event_type");
                Err(WebhookError::UnhandledEventType(event_type))
            }
        }
    }

    async fn user_created(
        &self,
        event: &WebhookEvent,
        clerk_id: &str,
    ) -> Result<Option<User>, WebhookError> {
        let email = event.data.primary_email().ok_or_else(|| {
            warn!(clerk_id = %clerk_id, "webhook_missing_email");
            WebhookError::MissingEmail
        })?;

        let new_user = event.data.to_new_user(clerk_id, email);

        let created = self.users.create_user(new_user).await.map_err(|e| {
            error!(clerk_id = %clerk_id, error = %e, "user_create_failed");
            WebhookError::Store(e)
        })?;

        if let Some(user) = &created {
            info!(clerk_id = %clerk_id, user_id = %user.id, "user_created");

            // A linking failure leaves the created row in place
            self.metadata
                .update_public_metadata(clerk_id, &json!({ "userId": user.id }))
                .await
                .map_err(|e| {
                    error!(
                        clerk_id = %clerk_id,
                        user_id = %user.id,
                        error = %e,
                        "clerk_metadata_link_failed"
                    );
                    WebhookError::Metadata(e)
                })?;
        }

        Ok(created)
    }

    async fn user_updated(
        &self,
        event: &WebhookEvent,
        clerk_id: &str,
    ) -> Result<Option<User>, WebhookError> {
        let updated = self
            .users
            .update_user(clerk_id, event.data.to_update())
            .await
            .map_err(|e| {
                error!(clerk_id = %clerk_id, error = %e, "user_update_failed");
                WebhookError::Store(e)
            })?;

        info!(clerk_id = %clerk_id, found = updated.is_some(), "user_updated");

        Ok(updated)
    }

    async fn user_deleted(&self, clerk_id: &str) -> Result<Option<User>, WebhookError> {
        let deleted = self.users.delete_user(clerk_id).await.map_err(|e| {
            error!(clerk_id = %clerk_id, error = %e, "user_delete_failed");
            WebhookError::Store(e)
        })?;

        info!(clerk_id = %clerk_id, found = deleted.is_some(), "user_deleted");

        Ok(deleted)
    }
}
