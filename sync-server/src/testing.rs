//! Deterministic collaborators for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::clerk::{IdentityMetadataUpdater, MetadataError};
use crate::users::{NewUser, StoreError, User, UserStore, UserUpdate};
use crate::web::signature::{SignatureHeaders, Verifier, VerifyError};

pub const TEST_SECRET: &str = "whsec_dGVzdC1zaWduaW5nLWtleQ==";

/// Accepts or rejects every payload, counting calls.
#[derive(Default)]
pub struct FakeVerifier {
    pub reject: bool,
    pub calls: AtomicUsize,
}

impl FakeVerifier {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            reject: true,
            ..Self::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Verifier for FakeVerifier {
    fn verify(
        &self,
        _secret: &str,
        _headers: &SignatureHeaders,
        _payload: &[u8],
    ) -> Result<(), VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            Err(VerifyError::NoMatchingSignature)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create(NewUser),
    Update(String, UserUpdate),
    Delete(String),
}

/// Records every call; create echoes the user back with id `db_<n>`.
#[derive(Default)]
pub struct RecordingStore {
    pub fail: bool,
    pub create_returns_none: bool,
    pub calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) -> Result<usize, StoreError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        if self.fail {
            return Err(StoreError::Unavailable("test store".to_string()));
        }
        Ok(calls.len())
    }
}

#[async_trait]
impl UserStore for RecordingStore {
    async fn create_user(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let n = self.record(StoreCall::Create(user.clone()))?;
        if self.create_returns_none {
            return Ok(None);
        }
        Ok(Some(User::from_new(format!("db_{}", n), user)))
    }

    async fn update_user(
        &self,
        clerk_id: &str,
        update: UserUpdate,
    ) -> Result<Option<User>, StoreError> {
        self.record(StoreCall::Update(clerk_id.to_string(), update.clone()))?;
        let mut user = User::from_new(
            "db_existing".to_string(),
            NewUser {
                clerk_id: clerk_id.to_string(),
                email: "existing@example.com".to_string(),
                username: "".to_string(),
                first_name: "".to_string(),
                last_name: "".to_string(),
                photo: None,
            },
        );
        user.apply(update);
        Ok(Some(user))
    }

    async fn delete_user(&self, clerk_id: &str) -> Result<Option<User>, StoreError> {
        self.record(StoreCall::Delete(clerk_id.to_string()))?;
        Ok(None)
    }
}

/// Records metadata updates, optionally failing them.
#[derive(Default)]
pub struct RecordingMetadata {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingMetadata {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityMetadataUpdater for RecordingMetadata {
    async fn update_public_metadata(
        &self,
        clerk_id: &str,
        metadata: &Value,
    ) -> Result<(), MetadataError> {
        self.calls
            .lock()
            .unwrap()
            .push((clerk_id.to_string(), metadata.clone()));
        if self.fail {
            return Err(MetadataError::NotConfigured);
        }
        Ok(())
    }
}
