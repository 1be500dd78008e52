//! Domain entities for the CurlARC teams domain
//!
//! Users and teams never embed each other. Their association is the
//! [`Membership`] row, looked up through the membership store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use curlarc_common::{Error, FieldUpdate, Result, TeamId, UserId};

use crate::domain::state::{state_label, MembershipEvent, MembershipState, MembershipStateMachine};
use crate::domain::validation::{normalize_email, validate_email, validate_name};

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a user's profile
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: FieldUpdate<String>,
    #[serde(default)]
    pub email: FieldUpdate<String>,
}

impl User {
    /// Create a new user with validation
    pub fn new(id: UserId, name: String, email: &str) -> Result<Self> {
        validate_name("User", &name)?;
        let email = normalize_email(email);
        validate_email(&email)?;

        let now = Utc::now();
        Ok(User {
            id,
            name,
            email,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a profile update. Nothing changes unless every supplied field is valid.
    pub fn apply_update(&mut self, update: UserUpdate) -> Result<()> {
        if let FieldUpdate::Set(name) = &update.name {
            validate_name("User", name)?;
        }
        let email = update.email.into_option().map(|e| normalize_email(&e));
        if let Some(email) = &email {
            validate_email(email)?;
        }

        update.name.apply_to(&mut self.name);
        if let Some(email) = email {
            self.email = email;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        validate_name("User", &self.name)?;
        validate_email(&self.email)
    }
}

/// Team entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team with a fresh id
    pub fn new(name: String) -> Result<Self> {
        validate_name("Team", &name)?;

        let now = Utc::now();
        Ok(Team {
            id: TeamId::generate(),
            name,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rename(&mut self, name: String) -> Result<()> {
        validate_name("Team", &name)?;
        self.name = name;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Membership entity - association between User and Team
///
/// At most one row exists per (user_id, team_id); the store enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub state: MembershipState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// Row for a user who is not yet related to the team, after `event`
    pub fn start(user_id: UserId, team_id: TeamId, event: MembershipEvent) -> Result<Self> {
        let state = next_state(None, event)?.ok_or_else(|| {
            Error::Validation(format!("'{}' does not create a membership", event))
        })?;

        let now = Utc::now();
        Ok(Membership {
            user_id,
            team_id,
            state,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_member(&self) -> bool {
        self.state == MembershipState::Member
    }

    pub fn is_invited(&self) -> bool {
        self.state == MembershipState::Invited
    }
}

/// Run the state machine and translate rejections into domain errors
///
/// Invitations and acceptances that collide with an existing row surface as
/// `AlreadyInvited` / `AlreadyMember`; acting on a missing row is `NotFound`.
pub fn next_state(
    current: Option<MembershipState>,
    event: MembershipEvent,
) -> Result<Option<MembershipState>> {
    MembershipStateMachine::transition(current, event).map_err(|err| match (current, event) {
        (Some(MembershipState::Member), _) => {
            Error::AlreadyMember("user is already a member of the team".to_string())
        }
        (Some(MembershipState::Invited), MembershipEvent::Invite | MembershipEvent::Add) => {
            Error::AlreadyInvited("user is already invited to the team".to_string())
        }
        (None, MembershipEvent::Accept) => {
            Error::NotFound("no pending invitation for this team".to_string())
        }
        (None, MembershipEvent::Remove) => {
            Error::NotFound("user is not related to the team".to_string())
        }
        _ => Error::InvalidTransition(err),
    })
    .inspect_err(|e| {
        tracing::debug!(from = state_label(current), %event, error = %e, "Membership transition rejected");
    })
}
