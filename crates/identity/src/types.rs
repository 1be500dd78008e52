//! Identity types

use curlarc_common::UserId;
use serde::{Deserialize, Serialize};

/// Identity asserted by the provider after successful token verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Stable provider uid, used as the user's id
    pub user_id: UserId,
    /// Email the provider holds for this identity, if any
    pub email: Option<String>,
}

impl VerifiedIdentity {
    pub fn new(user_id: UserId, email: Option<String>) -> Self {
        Self { user_id, email }
    }
}
