//! Identity provider trait

use curlarc_common::UserId;

use crate::error::IdentityError;
use crate::types::VerifiedIdentity;

/// Identity boundary consumed by the user services
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a caller-supplied token and return the identity it asserts
    async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;

    /// Remove the provider-side account for a user
    ///
    /// Used when a user deletes their account and to roll back a sign-up
    /// whose local persistence failed.
    async fn delete_identity(&self, user_id: &UserId) -> Result<(), IdentityError>;
}
