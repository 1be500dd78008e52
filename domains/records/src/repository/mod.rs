//! Persistence boundary for match records

use curlarc_common::{RecordId, RepoResult, TeamId};

use crate::domain::entities::Record;

/// Record store
#[async_trait::async_trait]
pub trait RecordRepository: Send + Sync {
    /// Insert a record. `AlreadyExists` if the id is taken, `NotFound` if
    /// the owning team does not exist.
    async fn save(&self, record: &Record) -> RepoResult<Record>;

    async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Record>>;

    /// Records of a team, oldest first
    async fn find_by_team_id(&self, team_id: &TeamId) -> RepoResult<Vec<Record>>;

    /// Replace a stored record if its `version` still matches the stored
    /// one, returning it with the version bumped. `NotFound` if it has been
    /// deleted, `Stale` if another write landed since it was read.
    async fn update(&self, record: &Record) -> RepoResult<Record>;

    async fn delete(&self, id: &RecordId) -> RepoResult<()>;
}
