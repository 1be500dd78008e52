//! Shared persistence types for CurlARC
//!
//! The storage boundary reports failures with [`RepositoryError`]; services
//! translate it into the domain [`crate::Error`] taxonomy.

use thiserror::Error;

/// Storage-boundary error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    /// A uniqueness constraint rejected the write
    #[error("Entity already exists")]
    AlreadyExists,

    /// A versioned write found the stored entity had moved on
    #[error("Entity was modified concurrently")]
    Stale,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type returned by store traits
pub type RepoResult<T> = std::result::Result<T, RepositoryError>;
