//! User account use cases
//!
//! Sign-up and sign-in go through the identity boundary: the provider
//! verifies the caller's token and supplies the stable uid used as the
//! user's id.

use std::sync::Arc;

use curlarc_common::{Error, RepositoryError, Result, UserId};
use curlarc_identity::{IdentityError, IdentityProvider};

use crate::domain::entities::{User, UserUpdate};
use crate::repository::TeamsRepositories;
use crate::service::authz::load_user;

#[derive(Clone)]
pub struct UserService {
    repos: TeamsRepositories,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(repos: TeamsRepositories, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { repos, identity }
    }

    /// Register the verified caller as a user
    ///
    /// If the user cannot be stored, the provider account is deleted so the
    /// caller can retry sign-up from scratch. A concurrent sign-up of the
    /// same uid that got there first is left untouched.
    pub async fn sign_up(&self, id_token: &str, name: String, email: &str) -> Result<User> {
        let identity = self.identity.verify_token(id_token).await?;

        if self.repos.users.find_by_id(&identity.user_id).await?.is_some() {
            return Err(already_signed_up());
        }

        let user = User::new(identity.user_id.clone(), name, email)?;

        let err = match self.repos.users.save(&user).await {
            Ok(saved) => {
                tracing::info!(user_id = %saved.id, "User signed up");
                return Ok(saved);
            }
            Err(e) => e,
        };

        if err == RepositoryError::AlreadyExists
            && matches!(self.repos.users.find_by_id(&user.id).await, Ok(Some(_)))
        {
            tracing::info!(user_id = %user.id, "Lost sign-up race; user already stored");
            return Err(already_signed_up());
        }

        tracing::warn!(error = %err, user_id = %user.id, "Sign-up failed; removing provider account");
        if let Err(cleanup) = self.identity.delete_identity(&user.id).await {
            tracing::error!(error = %cleanup, user_id = %user.id, "Failed to remove provider account");
        }
        Err(match err {
            RepositoryError::AlreadyExists => {
                Error::Conflict("email is already registered".to_string())
            }
            other => Error::from(other),
        })
    }

    /// Resolve a token to a registered user
    pub async fn authorize(&self, id_token: &str) -> Result<User> {
        let identity = self.identity.verify_token(id_token).await?;
        load_user(self.repos.users.as_ref(), &identity.user_id).await
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<User> {
        load_user(self.repos.users.as_ref(), user_id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.repos.users.find_all().await?)
    }

    /// Update the caller's own profile
    pub async fn update_user(&self, caller: &UserId, update: UserUpdate) -> Result<User> {
        let mut user = load_user(self.repos.users.as_ref(), caller).await?;
        user.apply_update(update)?;

        let updated = self.repos.users.update(&user).await.map_err(|e| match e {
            RepositoryError::AlreadyExists => Error::Conflict("email is already in use".to_string()),
            other => {
                tracing::error!(error = %other, user_id = %caller, "Failed to update user profile");
                Error::from(other)
            }
        })?;

        tracing::info!(user_id = %caller, "User profile updated");
        Ok(updated)
    }

    /// Delete the caller's account
    ///
    /// The local user goes first, taking its memberships with it, so a
    /// storage failure leaves the caller able to sign in and retry. A
    /// provider failure afterwards is reported; the uid may sign up again.
    pub async fn delete_user(&self, caller: &UserId) -> Result<()> {
        load_user(self.repos.users.as_ref(), caller).await?;

        self.repos.users.delete(caller).await.map_err(|e| {
            tracing::error!(error = %e, user_id = %caller, "Failed to delete user");
            Error::from(e)
        })?;

        match self.identity.delete_identity(caller).await {
            Ok(()) => {}
            Err(IdentityError::UnknownIdentity(_)) => {
                tracing::warn!(user_id = %caller, "Provider has no account for user");
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %caller, "User deleted locally but provider account remains");
                return Err(e.into());
            }
        }

        tracing::info!(user_id = %caller, "User deleted");
        Ok(())
    }
}

fn already_signed_up() -> Error {
    Error::Conflict("user is already signed up".to_string())
}
