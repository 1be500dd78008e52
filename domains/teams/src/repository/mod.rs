//! Persistence boundary for the teams domain
//!
//! The core only talks to storage through these traits. Implementations
//! must enforce the uniqueness rules documented on each method atomically;
//! the services' existence checks are advisory pre-checks only.

use std::sync::Arc;

use curlarc_common::{RepoResult, TeamId, UserId};

use crate::domain::entities::{Membership, Team, User};
use crate::domain::state::MembershipState;

/// User store
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. `AlreadyExists` if the id or the email is taken.
    async fn save(&self, user: &User) -> RepoResult<User>;

    async fn find_by_id(&self, id: &UserId) -> RepoResult<Option<User>>;

    /// Lookup by normalized email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn find_all(&self) -> RepoResult<Vec<User>>;

    /// Replace a stored user. `NotFound` if absent, `AlreadyExists` if the
    /// new email belongs to someone else.
    async fn update(&self, user: &User) -> RepoResult<User>;

    /// Delete a user together with all of its memberships.
    async fn delete(&self, id: &UserId) -> RepoResult<()>;
}

/// Team store
#[async_trait::async_trait]
pub trait TeamRepository: Send + Sync {
    async fn save(&self, team: &Team) -> RepoResult<Team>;

    async fn find_by_id(&self, id: &TeamId) -> RepoResult<Option<Team>>;

    async fn find_all(&self) -> RepoResult<Vec<Team>>;

    async fn update(&self, team: &Team) -> RepoResult<Team>;

    /// Delete a team, its memberships and its records in one transaction.
    async fn delete(&self, id: &TeamId) -> RepoResult<()>;
}

/// Membership store
#[async_trait::async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Insert a membership row. `AlreadyExists` if the (user, team) pair
    /// already has one, whatever its state.
    async fn save(&self, membership: &Membership) -> RepoResult<Membership>;

    async fn find(&self, user_id: &UserId, team_id: &TeamId) -> RepoResult<Option<Membership>>;

    /// Compare-and-set the state of an existing row. `NotFound` if there is
    /// no row or it is not currently in `expected`.
    async fn update_state(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
        expected: MembershipState,
        next: MembershipState,
    ) -> RepoResult<Membership>;

    /// Remove the row. `NotFound` if there is none.
    async fn delete(&self, user_id: &UserId, team_id: &TeamId) -> RepoResult<()>;

    async fn is_member(&self, user_id: &UserId, team_id: &TeamId) -> RepoResult<bool>;

    /// Teams where the user is MEMBER
    async fn team_ids_of(&self, user_id: &UserId) -> RepoResult<Vec<TeamId>>;

    /// Teams where the user is INVITED
    async fn invited_team_ids_of(&self, user_id: &UserId) -> RepoResult<Vec<TeamId>>;

    /// Users who are MEMBER of the team
    async fn member_ids_of(&self, team_id: &TeamId) -> RepoResult<Vec<UserId>>;

    /// Users who are MEMBER or INVITED
    async fn related_user_ids_of(&self, team_id: &TeamId) -> RepoResult<Vec<UserId>>;
}

/// Combined store access for the teams domain
#[derive(Clone)]
pub struct TeamsRepositories {
    pub users: Arc<dyn UserRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
}

impl TeamsRepositories {
    pub fn new(
        users: Arc<dyn UserRepository>,
        teams: Arc<dyn TeamRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            users,
            teams,
            memberships,
        }
    }

    /// Wire all three stores to one backend implementing every trait
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + TeamRepository + MembershipRepository + 'static,
    {
        Self {
            users: store.clone(),
            teams: store.clone(),
            memberships: store,
        }
    }
}
