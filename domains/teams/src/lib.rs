//! Teams domain: users, teams, memberships, invitations

pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{MembershipEvent, MembershipState, MembershipStateMachine, StateError};
// Re-export repository types
pub use repository::{MembershipRepository, TeamRepository, TeamsRepositories, UserRepository};
// Re-export use cases
pub use service::{MembershipService, TeamService, UserService};
