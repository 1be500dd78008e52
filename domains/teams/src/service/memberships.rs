//! Team membership use cases
//!
//! Invitations, acceptance and removal. Every transition re-validates that
//! both the team and the user exist and runs the membership state machine
//! before touching the store. The store's uniqueness constraint stays the
//! authoritative guard against concurrent invites and double acceptance.

use curlarc_common::{
    Error, InviteFailureReason, InviteReport, RepositoryError, Result, TeamId, UserId,
};

use crate::domain::entities::{next_state, Membership};
use crate::domain::state::{MembershipEvent, MembershipState};
use crate::domain::validation::normalize_email;
use crate::repository::TeamsRepositories;
use crate::service::authz::{load_team, load_user, require_member};

#[derive(Clone)]
pub struct MembershipService {
    repos: TeamsRepositories,
}

impl MembershipService {
    pub fn new(repos: TeamsRepositories) -> Self {
        Self { repos }
    }

    /// Invite users to a team by email
    ///
    /// The inviter must be a MEMBER. Each target is handled independently:
    /// a failing target never stops the others. When any target fails the
    /// result is `Error::InviteFailure` carrying the full report, including
    /// the invitations that did land.
    pub async fn invite_users(
        &self,
        team_id: &TeamId,
        caller: &UserId,
        target_emails: &[String],
    ) -> Result<InviteReport> {
        load_team(self.repos.teams.as_ref(), team_id).await?;
        load_user(self.repos.users.as_ref(), caller).await?;
        require_member(self.repos.memberships.as_ref(), caller, team_id).await?;

        let mut report = InviteReport::new(team_id.clone());

        for email in target_emails {
            match self.invite_one(team_id, email).await {
                Ok(user_id) => {
                    tracing::info!(team_id = %team_id, user_id = %user_id, invited_by = %caller, "User invited to team");
                    report.record_success(email.clone(), user_id);
                }
                Err(reason) => {
                    tracing::warn!(team_id = %team_id, email = %email, reason = %reason, "Invitation failed");
                    report.record_failure(email.clone(), reason);
                }
            }
        }

        if report.is_complete_success() {
            Ok(report)
        } else {
            Err(Error::InviteFailure(report))
        }
    }

    async fn invite_one(
        &self,
        team_id: &TeamId,
        email: &str,
    ) -> std::result::Result<UserId, InviteFailureReason> {
        let target = self
            .repos
            .users
            .find_by_email(&normalize_email(email))
            .await
            .map_err(|e| InviteFailureReason::Persistence(e.to_string()))?
            .ok_or(InviteFailureReason::TargetNotFound)?;

        let current = self
            .repos
            .memberships
            .find(&target.id, team_id)
            .await
            .map_err(|e| InviteFailureReason::Persistence(e.to_string()))?
            .map(|m| m.state);
        next_state(current, MembershipEvent::Invite).map_err(|e| invite_reason(&e))?;

        let membership = Membership::start(target.id.clone(), team_id.clone(), MembershipEvent::Invite)
            .map_err(|e| invite_reason(&e))?;

        match self.repos.memberships.save(&membership).await {
            Ok(_) => Ok(target.id),
            // Lost a race against a concurrent invite or acceptance
            Err(RepositoryError::AlreadyExists) => Err(self.conflict_reason(&target.id, team_id).await),
            Err(e) => Err(InviteFailureReason::Persistence(e.to_string())),
        }
    }

    async fn conflict_reason(&self, user_id: &UserId, team_id: &TeamId) -> InviteFailureReason {
        match self.repos.memberships.find(user_id, team_id).await {
            Ok(Some(m)) if m.is_member() => InviteFailureReason::AlreadyMember,
            _ => InviteFailureReason::AlreadyInvited,
        }
    }

    /// Accept a pending invitation (INVITED -> MEMBER)
    ///
    /// Only the invitee can accept; the caller's own INVITED row is the
    /// authorization.
    pub async fn accept_invitation(&self, team_id: &TeamId, caller: &UserId) -> Result<Membership> {
        load_team(self.repos.teams.as_ref(), team_id).await?;
        load_user(self.repos.users.as_ref(), caller).await?;

        let current = self.current_state(caller, team_id).await?;
        next_state(current, MembershipEvent::Accept)?;

        let membership = match self
            .repos
            .memberships
            .update_state(caller, team_id, MembershipState::Invited, MembershipState::Member)
            .await
        {
            Ok(membership) => membership,
            // The row changed after it was read: accepted or removed concurrently
            Err(RepositoryError::NotFound) => {
                let current = self.current_state(caller, team_id).await?;
                return Err(next_state(current, MembershipEvent::Accept)
                    .err()
                    .unwrap_or_else(|| {
                        Error::NotFound("no pending invitation for this team".to_string())
                    }));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(team_id = %team_id, user_id = %caller, "Invitation accepted");
        Ok(membership)
    }

    /// Reject a pending invitation (INVITED -> not related)
    pub async fn decline_invitation(&self, team_id: &TeamId, caller: &UserId) -> Result<()> {
        load_team(self.repos.teams.as_ref(), team_id).await?;
        load_user(self.repos.users.as_ref(), caller).await?;

        match self.current_state(caller, team_id).await? {
            Some(MembershipState::Invited) => {}
            Some(MembershipState::Member) => {
                return Err(Error::AlreadyMember(
                    "invitation was already accepted".to_string(),
                ))
            }
            None => {
                return Err(Error::NotFound(
                    "no pending invitation for this team".to_string(),
                ))
            }
        }

        self.delete_row(caller, team_id).await?;
        tracing::info!(team_id = %team_id, user_id = %caller, "Invitation declined");
        Ok(())
    }

    /// Remove a user's relation to a team ({INVITED, MEMBER} -> not related)
    ///
    /// Callers may always remove themselves (leave, or reject an invite).
    /// Removing somebody else requires the caller to be a MEMBER.
    pub async fn remove_member(
        &self,
        team_id: &TeamId,
        caller: &UserId,
        target: &UserId,
    ) -> Result<()> {
        load_team(self.repos.teams.as_ref(), team_id).await?;
        load_user(self.repos.users.as_ref(), target).await?;

        if caller != target {
            require_member(self.repos.memberships.as_ref(), caller, team_id).await?;
        }

        let current = self.current_state(target, team_id).await?;
        next_state(current, MembershipEvent::Remove)?;

        self.delete_row(target, team_id).await?;
        tracing::info!(team_id = %team_id, user_id = %target, removed_by = %caller, "Membership removed");
        Ok(())
    }

    /// Whether the user is currently a MEMBER of the team
    pub async fn is_member(&self, user_id: &UserId, team_id: &TeamId) -> Result<bool> {
        Ok(self.repos.memberships.is_member(user_id, team_id).await?)
    }

    /// Current state of the (user, team) pair; `None` = not related
    pub async fn state_of(&self, user_id: &UserId, team_id: &TeamId) -> Result<Option<MembershipState>> {
        self.current_state(user_id, team_id).await
    }

    async fn current_state(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
    ) -> Result<Option<MembershipState>> {
        Ok(self
            .repos
            .memberships
            .find(user_id, team_id)
            .await?
            .map(|m| m.state))
    }

    async fn delete_row(&self, user_id: &UserId, team_id: &TeamId) -> Result<()> {
        self.repos
            .memberships
            .delete(user_id, team_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => {
                    Error::NotFound("user is not related to the team".to_string())
                }
                other => {
                    tracing::error!(error = %other, user_id = %user_id, team_id = %team_id, "Failed to delete membership");
                    Error::from(other)
                }
            })
    }
}

fn invite_reason(err: &Error) -> InviteFailureReason {
    match err {
        Error::AlreadyMember(_) => InviteFailureReason::AlreadyMember,
        Error::AlreadyInvited(_) => InviteFailureReason::AlreadyInvited,
        other => InviteFailureReason::Persistence(other.to_string()),
    }
}
