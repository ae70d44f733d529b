//! # chatas-client
//!
//! Client-side state for the Chatas messenger.
//!
//! A [`Session`] is built once at the root of the application and passed to
//! whatever needs it. It owns the HTTP [`ApiClient`], the persisted
//! logged-in user and the cached user [`Directory`]. Views such as
//! [`ChatView`] and [`ConversationList`] hold plain data and are updated by
//! folding server responses into them.

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod forms;
pub mod session;
pub mod storage;
pub mod views;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use directory::{Directory, DirectoryAction};
pub use error::{ClientError, Result};
pub use forms::{ProfileForm, RegisterForm};
pub use session::{Session, SessionState};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore};
pub use views::{ChatView, ConversationList, ConversationRow};
