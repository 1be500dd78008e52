//! Identity boundary for CurlARC
//!
//! Token issuance and verification mechanics live outside the core. This
//! crate defines the capability the core consumes: turn a caller-supplied
//! token into a verified, stable [`curlarc_common::UserId`].

mod error;
pub mod mock;
mod provider;
mod types;

pub use error::IdentityError;
pub use mock::MockIdentityProvider;
pub use provider::IdentityProvider;
pub use types::VerifiedIdentity;
