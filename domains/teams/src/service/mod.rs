//! Authorization-gated use cases for the teams domain

pub mod authz;
pub mod memberships;
pub mod teams;
pub mod users;

pub use authz::{load_team, load_user, require_member};
pub use memberships::MembershipService;
pub use teams::TeamService;
pub use users::UserService;
