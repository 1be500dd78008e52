//! Membership state machine
//!
//! A (user, team) pair is either unrelated (no stored row), INVITED or
//! MEMBER. Each transition is an explicit event:
//! - `Add`: not related -> MEMBER (team creator, no invitation step)
//! - `Invite`: not related -> INVITED
//! - `Accept`: INVITED -> MEMBER
//! - `Remove`: INVITED | MEMBER -> not related (leave, kick, reject invite)
//!
//! There is no MEMBER -> INVITED transition.

use serde::{Deserialize, Serialize};

pub use curlarc_common::StateError;

/// Stored membership states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipState {
    Invited,
    Member,
}

impl MembershipState {
    /// Get all valid next states from current state (`None` = not related)
    pub fn valid_transitions(&self) -> &'static [Option<MembershipState>] {
        match self {
            Self::Invited => &[Some(Self::Member), None],
            Self::Member => &[None],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "INVITED",
            Self::Member => "MEMBER",
        }
    }
}

impl std::fmt::Display for MembershipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label for a possibly-absent state
pub fn state_label(state: Option<MembershipState>) -> &'static str {
    match state {
        Some(s) => s.as_str(),
        None => "NOT_RELATED",
    }
}

/// Events that trigger membership transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipEvent {
    /// Insert directly as a member
    Add,
    /// Invite a user who is not related to the team
    Invite,
    /// Invitee accepts
    Accept,
    /// Leave, kick or reject an invitation
    Remove,
}

impl std::fmt::Display for MembershipEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Invite => write!(f, "invite"),
            Self::Accept => write!(f, "accept"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Membership state machine
pub struct MembershipStateMachine;

impl MembershipStateMachine {
    /// Attempt a transition; `None` on either side means "not related"
    pub fn transition(
        current: Option<MembershipState>,
        event: MembershipEvent,
    ) -> Result<Option<MembershipState>, StateError> {
        use MembershipEvent::*;
        use MembershipState::*;

        match (current, event) {
            (None, Add) => Ok(Some(Member)),
            (None, Invite) => Ok(Some(Invited)),
            (Some(Invited), Accept) => Ok(Some(Member)),
            (Some(_), Remove) => Ok(None),
            _ => Err(StateError::invalid(state_label(current), event)),
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: Option<MembershipState>, event: MembershipEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
