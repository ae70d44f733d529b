//! # chatas-server
//!
//! HTTP API for the Chatas messaging application.
//!
//! Every route lives under `/api` and speaks JSON:
//! - **users**: registration, login, directory listing and profile edits
//! - **conversations**: check-or-create for a user pair, per-user listing
//!   with unread flags, deletion
//! - **messages**: history, sending, mark-as-read and likes
//!
//! Request handlers hold no shared mutable state; each one opens its own
//! store connection and releases it before responding.

pub mod api;
pub mod config;
pub mod error;

mod conversations;
mod extract;
mod messages;
mod users;

pub use api::{build_router, serve, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
