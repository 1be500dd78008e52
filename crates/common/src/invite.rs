//! Outcome of a batch invitation
//!
//! Each target of a batch invite is processed independently; the report
//! collects which invitations landed and why the others did not.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{TeamId, UserId};

/// Why a single invitation target failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum InviteFailureReason {
    TargetNotFound,
    AlreadyMember,
    AlreadyInvited,
    Persistence(String),
}

impl fmt::Display for InviteFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound => write!(f, "target user not found"),
            Self::AlreadyMember => write!(f, "target is already a member of the team"),
            Self::AlreadyInvited => write!(f, "target is already invited to the team"),
            Self::Persistence(msg) => write!(f, "failed to store invitation: {}", msg),
        }
    }
}

/// A target that was successfully moved to the INVITED state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitedTarget {
    pub email: String,
    pub user_id: UserId,
}

/// A target whose invitation did not land
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteFailure {
    pub email: String,
    pub reason: InviteFailureReason,
}

/// Per-target results of one batch invite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteReport {
    pub team_id: TeamId,
    pub invited: Vec<InvitedTarget>,
    pub failures: Vec<InviteFailure>,
}

impl InviteReport {
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            invited: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self, email: impl Into<String>, user_id: UserId) {
        self.invited.push(InvitedTarget {
            email: email.into(),
            user_id,
        });
    }

    pub fn record_failure(&mut self, email: impl Into<String>, reason: InviteFailureReason) {
        self.failures.push(InviteFailure {
            email: email.into(),
            reason,
        });
    }

    /// True when every target was invited
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Look up the failure reason recorded for an email, if any
    pub fn failure_for(&self, email: &str) -> Option<&InviteFailureReason> {
        self.failures
            .iter()
            .find(|f| f.email == email)
            .map(|f| &f.reason)
    }
}

impl fmt::Display for InviteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} invitations to team {} failed",
            self.failures.len(),
            self.failures.len() + self.invited.len(),
            self.team_id
        )?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.email, failure.reason)?;
        }
        Ok(())
    }
}
