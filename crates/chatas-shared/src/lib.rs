//! # chatas-shared
//!
//! Types shared between the Chatas server and client: the JSON wire model
//! for users, conversations and messages, request/response bodies, form
//! validation rules and a handful of constants.

pub mod constants;
pub mod error;
pub mod types;
pub mod validation;

pub use error::{IdError, ValidationError};
pub use types::*;
