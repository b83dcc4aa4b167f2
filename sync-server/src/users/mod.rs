//! User persistence seam.
//!
//! The webhook receiver only ever talks to [`UserStore`]; where the rows
//! actually live is up to the implementation. [`InMemoryUserStore`] backs
//! the standalone binary.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryUserStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user with clerk id {0} already exists")]
    Conflict(String),

    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// Normalized user fields sent to the store when Clerk reports a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub clerk_id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
}

/// Profile fields Clerk may change on an existing user. Email is not synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub photo: Option<String>,
}

/// A user row as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub clerk_id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
}

impl User {
    pub fn from_new(id: String, user: NewUser) -> Self {
        Self {
            id,
            clerk_id: user.clerk_id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            photo: user.photo,
        }
    }

    pub fn apply(&mut self, update: UserUpdate) {
        self.first_name = update.first_name;
        self.last_name = update.last_name;
        self.username = update.username;
        self.photo = update.photo;
    }
}

/// Create/update/delete operations keyed by Clerk user id.
///
/// `None` means the store had nothing to return (e.g. no such user).
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<Option<User>, StoreError>;

    async fn update_user(
        &self,
        clerk_id: &str,
        update: UserUpdate,
    ) -> Result<Option<User>, StoreError>;

    async fn delete_user(&self, clerk_id: &str) -> Result<Option<User>, StoreError>;
}
