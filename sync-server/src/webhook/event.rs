//! Clerk webhook event payloads.
//!
//! Only the user fields the sync cares about are modelled. Clerk sends
//! `null` for unset profile fields, so everything is optional.

use serde::Deserialize;

use crate::users::{NewUser, UserUpdate};

/// Clerk event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: UserPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email_addresses: Option<Vec<EmailAddress>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub email_address: Option<String>,
}

/// The event types the receiver knows how to sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    UserCreated,
    UserUpdated,
    UserDeleted,
    Unknown(String),
}

impl EventKind {
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "user.created" => Self::UserCreated,
            "user.updated" => Self::UserUpdated,
            "user.deleted" => Self::UserDeleted,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::parse(&self.event_type)
    }

    /// The Clerk user id, if present and non-empty.
    pub fn user_id(&self) -> Option<&str> {
        self.data.id.as_deref().filter(|id| !id.is_empty())
    }
}

impl UserPayload {
    /// First listed email address, which Clerk treats as the primary one.
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .as_ref()?
            .first()?
            .email_address
            .as_deref()
            .filter(|email| !email.is_empty())
    }

    pub fn to_new_user(&self, clerk_id: &str, email: &str) -> NewUser {
        NewUser {
            clerk_id: clerk_id.to_string(),
            email: email.to_string(),
            username: self.username.clone().unwrap_or_default(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            photo: self.image_url.clone(),
        }
    }

    pub fn to_update(&self) -> UserUpdate {
        UserUpdate {
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            photo: self.image_url.clone(),
        }
    }
}
