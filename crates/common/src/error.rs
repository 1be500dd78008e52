//! Common error types and handling for CurlARC

use crate::db::RepositoryError;
use crate::invite::InviteReport;
use crate::state::StateError;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the CurlARC core
///
/// Every variant is a normal return value. Callers inspect the variant (or
/// [`Error::error_code`]) instead of parsing the message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid ends data: {0}")]
    InvalidEndsData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already a member: {0}")]
    AlreadyMember(String),

    #[error("Already invited: {0}")]
    AlreadyInvited(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(#[from] StateError),

    #[error("Invitation failed: {0}")]
    InviteFailure(InviteReport),
}

impl Error {
    /// Get the error code for callers
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Persistence(_) => "PERSISTENCE_ERROR",
            Error::Authentication(_) => "AUTHENTICATION_ERROR",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::InvalidDate(_) => "INVALID_DATE",
            Error::InvalidEndsData(_) => "INVALID_ENDS_DATA",
            Error::NotFound(_) => "NOT_FOUND",
            Error::AlreadyMember(_) => "ALREADY_MEMBER",
            Error::AlreadyInvited(_) => "ALREADY_INVITED",
            Error::Conflict(_) => "CONFLICT",
            Error::InvalidTransition(_) => "INVALID_TRANSITION",
            Error::InviteFailure(_) => "INVITE_FAILURE",
        }
    }

    /// Whether the caller supplied something the core refused to accept
    /// (as opposed to an infrastructure failure)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Unexpected(_) | Error::Persistence(_))
    }

    /// Returns the per-target report of a partially failed batch invite
    pub fn invite_report(&self) -> Option<&InviteReport> {
        match self {
            Error::InviteFailure(report) => Some(report),
            _ => None,
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Error::NotFound("Entity not found".to_string()),
            RepositoryError::AlreadyExists => Error::Conflict("Entity already exists".to_string()),
            RepositoryError::Stale => {
                Error::Conflict("Entity was modified concurrently".to_string())
            }
            RepositoryError::Backend(msg) => Error::Persistence(msg),
        }
    }
}
