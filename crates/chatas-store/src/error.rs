use chatas_shared::UniqueField;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Registration or profile edit collided with an existing user.
    #[error("A user with this {0} already exists")]
    Duplicate(UniqueField),

    /// Unknown username or wrong password; deliberately indistinguishable.
    #[error("Invalid username and/or password")]
    InvalidCredentials,

    /// Message targeted a conversation that does not exist.
    #[error("Invalid conversation: {0}")]
    InvalidConversation(Uuid),

    /// Both participants of a conversation would be the same user.
    #[error("A conversation needs two different users")]
    SelfConversation,

    /// The acting user is not a participant of the conversation.
    #[error("User {0} is not a participant of this conversation")]
    NotParticipant(Uuid),

    /// A user tried to like their own message.
    #[error("Users cannot like their own messages")]
    SelfLike,

    /// Password hashing primitive failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Map `QueryReturnedNoRows` to [`StoreError::NotFound`].
pub(crate) fn not_found(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Sqlite(other),
    }
}
