//! CurlARC application composition root
//!
//! Builds every use-case service over one shared store and one identity
//! provider. This is the only place that reads configuration.

pub mod telemetry;

use std::sync::Arc;

use curlarc_common::config::{Config, IdentityProviderKind};
use curlarc_identity::{IdentityProvider, MockIdentityProvider};
use curlarc_records::RecordService;
use curlarc_store::MemoryStore;
use curlarc_teams::{MembershipService, TeamService, TeamsRepositories, UserService};

/// Fully wired application
#[derive(Clone)]
pub struct App {
    pub users: UserService,
    pub teams: TeamService,
    pub memberships: MembershipService,
    pub records: RecordService,
    pub store: Arc<MemoryStore>,
    pub identity: MockIdentityProvider,
}

/// Create the application over a fresh in-memory store
pub fn create_app(config: &Config) -> Result<App, anyhow::Error> {
    let store = Arc::new(MemoryStore::new());

    let identity = match config.identity_provider {
        IdentityProviderKind::Mock => MockIdentityProvider::new(),
    };
    let provider: Arc<dyn IdentityProvider> = Arc::new(identity.clone());

    let repos = TeamsRepositories::from_store(store.clone());
    let app = App {
        users: UserService::new(repos.clone(), provider),
        teams: TeamService::new(repos.clone()),
        memberships: MembershipService::new(repos.clone()),
        records: RecordService::new(store.clone(), &repos),
        store,
        identity,
    };

    tracing::info!(identity_provider = ?config.identity_provider, "Application wired");
    Ok(app)
}
