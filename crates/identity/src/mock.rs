//! Mock Identity Provider Implementation
//!
//! In-memory token registry for tests and local development. Tokens are
//! registered up front; deleted identities are remembered so tests can
//! assert on sign-up rollback and account deletion.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use curlarc_common::UserId;

use crate::error::IdentityError;
use crate::provider::IdentityProvider;
use crate::types::VerifiedIdentity;

#[derive(Debug, Default)]
struct MockState {
    tokens: HashMap<String, VerifiedIdentity>,
    deleted: HashSet<UserId>,
    unavailable: bool,
}

/// Mock identity provider for testing
#[derive(Debug, Clone, Default)]
pub struct MockIdentityProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockIdentityProvider {
    /// Create a new mock provider with no registered tokens
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token that verifies to the given identity
    pub fn register_token(
        &self,
        token: impl Into<String>,
        user_id: UserId,
        email: Option<String>,
    ) -> VerifiedIdentity {
        let identity = VerifiedIdentity::new(user_id, email);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.deleted.remove(&identity.user_id);
        state.tokens.insert(token.into(), identity.clone());
        identity
    }

    /// Simulate a provider outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).unavailable = unavailable;
    }

    /// Whether `delete_identity` was called for this user
    pub fn was_deleted(&self, user_id: &UserId) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).deleted.contains(user_id)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.unavailable {
            return Err(IdentityError::Provider("mock provider unavailable".to_string()));
        }

        let identity = state
            .tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)?;

        if state.deleted.contains(&identity.user_id) {
            tracing::debug!(user_id = %identity.user_id, "Token belongs to a deleted identity");
            return Err(IdentityError::InvalidToken);
        }

        Ok(identity)
    }

    async fn delete_identity(&self, user_id: &UserId) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.unavailable {
            return Err(IdentityError::Provider("mock provider unavailable".to_string()));
        }

        let known = state.tokens.values().any(|i| &i.user_id == user_id);
        if !known {
            return Err(IdentityError::UnknownIdentity(user_id.to_string()));
        }

        state.deleted.insert(user_id.clone());
        tracing::info!(user_id = %user_id, "Mock identity deleted");
        Ok(())
    }
}
