//! Authorization gate shared by every team-scoped operation
//!
//! Authentication has already happened upstream; these checks decide
//! whether an identified caller may act on a given team.

use curlarc_common::{Error, Result, TeamId, UserId};

use crate::domain::entities::{Team, User};
use crate::repository::{MembershipRepository, TeamRepository, UserRepository};

/// Fail with `Forbidden` unless `caller` is a MEMBER of `team_id`
///
/// An INVITED row does not count.
pub async fn require_member(
    memberships: &dyn MembershipRepository,
    caller: &UserId,
    team_id: &TeamId,
) -> Result<()> {
    let is_member = memberships.is_member(caller, team_id).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %caller, team_id = %team_id, "Failed to check membership");
        Error::from(e)
    })?;

    if !is_member {
        tracing::warn!(user_id = %caller, team_id = %team_id, "Access denied: not a member of this team");
        return Err(Error::Forbidden(
            "caller is not a member of the team".to_string(),
        ));
    }

    Ok(())
}

/// Load a team or fail with `NotFound`
pub async fn load_team(teams: &dyn TeamRepository, team_id: &TeamId) -> Result<Team> {
    teams
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Team {} not found", team_id)))
}

/// Load a user or fail with `NotFound`
pub async fn load_user(users: &dyn UserRepository, user_id: &UserId) -> Result<User> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
}
