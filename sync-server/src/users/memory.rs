//! Process-local user store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{NewUser, StoreError, User, UserStore, UserUpdate};

/// Users held in memory, keyed by Clerk id.
///
/// Clerk ids are unique here the same way a unique index would make them
/// unique in a database: a second create for the same id is a conflict.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, clerk_id: &str) -> Option<User> {
        self.users.read().await.get(clerk_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.clerk_id) {
            return Err(StoreError::Conflict(user.clerk_id));
        }

        let created = User::from_new(Uuid::new_v4().simple().to_string(), user);
        users.insert(created.clerk_id.clone(), created.clone());

        info!(user_id = %created.id, clerk_id = %created.clerk_id, "user_store_inserted");

        Ok(Some(created))
    }

    async fn update_user(
        &self,
        clerk_id: &str,
        update: UserUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(clerk_id).map(|user| {
            user.apply(update);
            user.clone()
        }))
    }

    async fn delete_user(&self, clerk_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.write().await.remove(clerk_id))
    }
}
