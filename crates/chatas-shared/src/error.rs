use thiserror::Error;

/// A form field failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// An identifier string is not a well-formed UUID.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed id: {0}")]
pub struct IdError(pub String);
