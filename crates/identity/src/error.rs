//! Identity errors

use curlarc_common::Error;
use thiserror::Error;

/// Identity boundary error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Identity {0} is not known to the provider")]
    UnknownIdentity(String),

    /// The provider could not be reached or failed internally
    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl From<IdentityError> for Error {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken => Error::Authentication(err.to_string()),
            IdentityError::UnknownIdentity(_) => Error::NotFound(err.to_string()),
            IdentityError::Provider(msg) => Error::Persistence(msg),
        }
    }
}
