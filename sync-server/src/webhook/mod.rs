//! Clerk user webhook processing.
//!
//! ## Processing Flow
//!
//! ```text
//! secret → svix headers → JSON → signature → user id → EventKind → UserStore
//!                                                          └─ created → Clerk metadata
//! ```

pub mod event;
pub mod receiver;

pub use event::{EmailAddress, EventKind, UserPayload, WebhookEvent};
pub use receiver::WebhookReceiver;
