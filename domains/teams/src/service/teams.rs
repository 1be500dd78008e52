//! Team use cases

use curlarc_common::{Error, Result, TeamId, UserId};

use crate::domain::entities::{Membership, Team, User};
use crate::domain::state::MembershipEvent;
use crate::repository::TeamsRepositories;
use crate::service::authz::{load_team, load_user, require_member};

#[derive(Clone)]
pub struct TeamService {
    repos: TeamsRepositories,
}

impl TeamService {
    pub fn new(repos: TeamsRepositories) -> Self {
        Self { repos }
    }

    /// Create a team with the caller as its first MEMBER
    ///
    /// The creator skips the invitation step. If the creator's membership
    /// cannot be stored the team is removed again.
    pub async fn create_team(&self, caller: &UserId, name: String) -> Result<Team> {
        load_user(self.repos.users.as_ref(), caller).await?;

        let team = Team::new(name)?;
        let membership = Membership::start(caller.clone(), team.id.clone(), MembershipEvent::Add)?;

        let saved = self.repos.teams.save(&team).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create team");
            Error::from(e)
        })?;

        if let Err(e) = self.repos.memberships.save(&membership).await {
            tracing::error!(error = %e, team_id = %saved.id, user_id = %caller, "Failed to add creator; rolling back team");
            if let Err(rollback) = self.repos.teams.delete(&saved.id).await {
                tracing::error!(error = %rollback, team_id = %saved.id, "Failed to roll back team");
            }
            return Err(e.into());
        }

        tracing::info!(team_id = %saved.id, user_id = %caller, "Team created");
        Ok(saved)
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        Ok(self.repos.teams.find_all().await?)
    }

    pub async fn get_team(&self, team_id: &TeamId) -> Result<Team> {
        load_team(self.repos.teams.as_ref(), team_id).await
    }

    /// Rename a team (members only)
    pub async fn update_team(&self, caller: &UserId, team_id: &TeamId, name: String) -> Result<Team> {
        let mut team = load_team(self.repos.teams.as_ref(), team_id).await?;
        require_member(self.repos.memberships.as_ref(), caller, team_id).await?;

        team.rename(name)?;
        let updated = self.repos.teams.update(&team).await?;

        tracing::info!(team_id = %team_id, user_id = %caller, "Team renamed");
        Ok(updated)
    }

    /// Delete a team (members only)
    ///
    /// The store removes the team's memberships and records in the same
    /// transaction.
    pub async fn delete_team(&self, caller: &UserId, team_id: &TeamId) -> Result<()> {
        load_team(self.repos.teams.as_ref(), team_id).await?;
        require_member(self.repos.memberships.as_ref(), caller, team_id).await?;

        self.repos.teams.delete(team_id).await.map_err(|e| {
            tracing::error!(error = %e, team_id = %team_id, "Failed to delete team");
            Error::from(e)
        })?;

        tracing::info!(team_id = %team_id, user_id = %caller, "Team deleted");
        Ok(())
    }

    /// Teams where the user is a MEMBER
    pub async fn teams_of(&self, user_id: &UserId) -> Result<Vec<Team>> {
        let ids = self.repos.memberships.team_ids_of(user_id).await?;
        self.load_teams(&ids).await
    }

    /// Teams that have invited the user and await acceptance
    pub async fn invited_teams_of(&self, user_id: &UserId) -> Result<Vec<Team>> {
        let ids = self.repos.memberships.invited_team_ids_of(user_id).await?;
        self.load_teams(&ids).await
    }

    /// MEMBERs of a team (members only)
    pub async fn members_of(&self, caller: &UserId, team_id: &TeamId) -> Result<Vec<User>> {
        load_team(self.repos.teams.as_ref(), team_id).await?;
        require_member(self.repos.memberships.as_ref(), caller, team_id).await?;

        let ids = self.repos.memberships.member_ids_of(team_id).await?;
        self.load_users(&ids).await
    }

    /// MEMBERs and pending invitees of a team (members only)
    pub async fn related_users_of(&self, caller: &UserId, team_id: &TeamId) -> Result<Vec<User>> {
        load_team(self.repos.teams.as_ref(), team_id).await?;
        require_member(self.repos.memberships.as_ref(), caller, team_id).await?;

        let ids = self.repos.memberships.related_user_ids_of(team_id).await?;
        self.load_users(&ids).await
    }

    async fn load_teams(&self, ids: &[TeamId]) -> Result<Vec<Team>> {
        let mut teams = Vec::with_capacity(ids.len());
        for id in ids {
            teams.push(load_team(self.repos.teams.as_ref(), id).await?);
        }
        Ok(teams)
    }

    async fn load_users(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            users.push(load_user(self.repos.users.as_ref(), id).await?);
        }
        Ok(users)
    }
}
