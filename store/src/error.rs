use thiserror::Error;

/// Errors surfaced by the storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The email address is already registered.
    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
