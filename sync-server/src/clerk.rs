//! Clerk backend API client.
//!
//! Only the one call the webhook flow needs: writing public metadata back
//! onto a Clerk user so the frontend can find the application's own id.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Clerk secret key is not configured")]
    NotConfigured,

    #[error("invalid Clerk API url: {0}")]
    InvalidUrl(String),

    #[error("Clerk API request failed")]
    Request(#[from] reqwest::Error),

    #[error("Clerk API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Stores provider-side metadata for a user.
#[async_trait]
pub trait IdentityMetadataUpdater: Send + Sync {
    async fn update_public_metadata(
        &self,
        clerk_id: &str,
        metadata: &Value,
    ) -> Result<(), MetadataError>;
}

/// HTTP client for the Clerk backend API.
#[derive(Clone)]
pub struct ClerkClient {
    inner: Arc<ClerkClientInner>,
}

struct ClerkClientInner {
    http: Client,
    base_url: Url,
    secret_key: Option<String>,
}

impl ClerkClient {
    /// Create a client against `base_url` (e.g. `https://api.clerk.com/v1`).
    pub fn new(
        base_url: &str,
        secret_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, MetadataError> {
        let base_url =
            Url::parse(base_url).map_err(|e| MetadataError::InvalidUrl(e.to_string()))?;

        if base_url.cannot_be_a_base() {
            return Err(MetadataError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(ClerkClientInner {
                http,
                base_url,
                secret_key,
            }),
        })
    }

    fn metadata_url(&self, clerk_id: &str) -> Result<Url, MetadataError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MetadataError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(["users", clerk_id, "metadata"]);
        Ok(url)
    }
}

#[async_trait]
impl IdentityMetadataUpdater for ClerkClient {
    async fn update_public_metadata(
        &self,
        clerk_id: &str,
        metadata: &Value,
    ) -> Result<(), MetadataError> {
        let secret_key = self
            .inner
            .secret_key
            .as_deref()
            .ok_or(MetadataError::NotConfigured)?;

        let url = self.metadata_url(clerk_id)?;

        let response = self
            .inner
            .http
            .patch(url)
            .bearer_auth(secret_key)
            .json(&json!({ "public_metadata": metadata }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                clerk_id = %clerk_id,
                status_code = status.as_u16(),
                "clerk_metadata_update_rejected"
            );
            return Err(MetadataError::Status { status, body });
        }

        info!(clerk_id = %clerk_id, "clerk_metadata_updated");

        Ok(())
    }
}
