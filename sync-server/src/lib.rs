//! Clerk user sync - webhook receiver and session route gate.
//!
//! This library backs the `clerk-sync-web` binary:
//! - Receives Clerk user lifecycle webhooks, verifies their Svix signature
//!   and mirrors the change into the application's user store
//! - Classifies every other request as ignored, public or protected and
//!   enforces a Clerk session on protected routes
//!
//! ## Architecture
//!
//! ```text
//! Request → TraceLayer → route gate ─┬─ ignored ──→ /api/webhooks/clerk → WebhookReceiver → UserStore
//!                                    ├─ public ───→ handler                          └─→ Clerk metadata
//!                                    └─ protected → session check → handler
//! ```

pub mod clerk;
pub mod config;
pub mod error;
pub mod gate;
pub mod users;
pub mod web;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use clerk::{ClerkClient, IdentityMetadataUpdater, MetadataError};
pub use config::Config;
pub use error::WebhookError;
pub use gate::{GateState, JwtSessionVerifier, RouteClass, RouteGate, SessionVerifier};
pub use users::{InMemoryUserStore, NewUser, StoreError, User, UserStore, UserUpdate};
pub use web::{build_router, AppState, SvixVerifier, Verifier};
pub use webhook::{EventKind, WebhookEvent, WebhookReceiver};
