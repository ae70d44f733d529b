//! # chatas-store
//!
//! SQLite-backed persistence for the Chatas server.
//!
//! The crate exposes a synchronous [`Database`] handle wrapping a
//! `rusqlite::Connection`, with typed operations for the three stores
//! (users, conversations, messages) and the unread aggregation that joins
//! them. A handle is meant to live for a single request: open it, use it,
//! drop it.

pub mod conversations;
pub mod database;
pub mod messages;
pub mod migrations;
pub mod password;
pub mod unread;
pub mod users;

mod error;
mod row;

pub use database::Database;
pub use error::{Result, StoreError};
