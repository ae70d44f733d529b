use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatas_shared::{ErrorBody, IdError, UniqueField, ValidationError};
use chatas_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("A user with this {0} already exists.")]
    Duplicate(UniqueField),

    #[error("No user with this username and/or password exists.")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    MalformedId(#[from] IdError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid conversation ID")]
    InvalidConversation,

    #[error("A conversation needs two different users")]
    SelfConversation,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Name the missing resource in a generic store `NotFound`.
    pub fn not_found_as(self, what: &'static str) -> Self {
        match self {
            ServerError::NotFound(_) => ServerError::NotFound(what),
            other => other,
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ServerError::NotFound("Record"),
            StoreError::Duplicate(field) => ServerError::Duplicate(field),
            StoreError::InvalidCredentials => ServerError::InvalidCredentials,
            StoreError::InvalidConversation(_) => ServerError::InvalidConversation,
            StoreError::SelfConversation => ServerError::SelfConversation,
            StoreError::NotParticipant(_) => {
                ServerError::Forbidden("not a participant of this conversation".into())
            }
            StoreError::SelfLike => ServerError::Forbidden("cannot like your own message".into()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Duplicate(_) => StatusCode::CONFLICT,
            ServerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::MalformedId(_)
            | ServerError::Validation(_)
            | ServerError::InvalidBody(_)
            | ServerError::InvalidConversation
            | ServerError::SelfConversation => StatusCode::BAD_REQUEST,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ServerError::Duplicate(_) => ErrorBody {
                error_message: Some(self.to_string()),
                ..Default::default()
            },
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                ErrorBody {
                    error: Some("Internal server error".to_string()),
                    ..Default::default()
                }
            }
            _ => {
                tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
                ErrorBody {
                    error: Some(self.to_string()),
                    ..Default::default()
                }
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
