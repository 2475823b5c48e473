//! Error types for the storage and service layers.

use thiserror::Error;

/// Failure reported by a [`ContactStore`](crate::store::ContactStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The insert violated the unique email constraint.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Any other engine-level failure.
    #[error("storage error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

/// Outcome of a rejected service operation.
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("a contact with email {0} already exists")]
    DuplicateEmail(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type ContactResult<T> = std::result::Result<T, ContactError>;
