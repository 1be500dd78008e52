//! Record use cases
//!
//! Every write is gated on the caller being a MEMBER of the team that owns
//! the record. For existing records the owning team is read from the
//! stored record, never from the caller's input.

use std::sync::Arc;

use curlarc_common::{Error, RecordId, RepositoryError, Result, TeamId, UserId};
use curlarc_teams::service::{load_team, require_member};
use curlarc_teams::{MembershipRepository, TeamRepository, TeamsRepositories};

use crate::domain::entities::{DataPerEnd, NewRecord, Record, RecordIndex};
use crate::domain::update::RecordUpdate;
use crate::repository::RecordRepository;

const MAX_APPEND_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct RecordService {
    records: Arc<dyn RecordRepository>,
    teams: Arc<dyn TeamRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl RecordService {
    pub fn new(records: Arc<dyn RecordRepository>, repos: &TeamsRepositories) -> Self {
        Self {
            records,
            teams: repos.teams.clone(),
            memberships: repos.memberships.clone(),
        }
    }

    /// Create an empty private record for a team
    pub async fn create_record(
        &self,
        caller: &UserId,
        team_id: &TeamId,
        options: NewRecord,
    ) -> Result<Record> {
        require_member(self.memberships.as_ref(), caller, team_id).await?;
        load_team(self.teams.as_ref(), team_id).await?;

        let record = Record::create(team_id.clone(), options)?;
        let saved = self.records.save(&record).await.map_err(|e| match e {
            // Team deleted between the check and the insert
            RepositoryError::NotFound => Error::NotFound(format!("Team {} not found", team_id)),
            other => {
                tracing::error!(error = %other, team_id = %team_id, "Failed to create record");
                Error::from(other)
            }
        })?;

        tracing::info!(record_id = %saved.id, team_id = %team_id, user_id = %caller, "Record created");
        Ok(saved)
    }

    /// Append ends to a record
    ///
    /// Appends commute, so a write that loses to a concurrent one is
    /// replayed on the fresh record.
    pub async fn append_ends_data(
        &self,
        caller: &UserId,
        record_id: &RecordId,
        ends: Vec<DataPerEnd>,
    ) -> Result<Record> {
        let appended = ends.len();
        let mut attempt = 1;

        loop {
            let mut record = self.load_for_write(caller, record_id).await?;
            record.append_ends_data(ends.clone())?;

            match self.records.update(&record).await {
                Ok(updated) => {
                    tracing::info!(record_id = %record_id, ends = appended, "Ends appended to record");
                    return Ok(updated);
                }
                Err(RepositoryError::Stale) if attempt < MAX_APPEND_ATTEMPTS => {
                    tracing::debug!(record_id = %record_id, attempt, "Record changed during append; retrying");
                    attempt += 1;
                }
                Err(e) => return Err(persist_error(record_id, e)),
            }
        }
    }

    /// Apply a partial update to a record
    pub async fn update_record(
        &self,
        caller: &UserId,
        record_id: &RecordId,
        update: RecordUpdate,
    ) -> Result<Record> {
        let mut record = self.load_for_write(caller, record_id).await?;
        if update.is_empty() {
            return Ok(record);
        }
        record.apply_update(update)?;

        let updated = self.persist(&record).await?;
        tracing::info!(record_id = %record_id, user_id = %caller, "Record updated");
        Ok(updated)
    }

    /// Publish or unpublish a record
    pub async fn set_visibility(
        &self,
        caller: &UserId,
        record_id: &RecordId,
        is_public: bool,
    ) -> Result<Record> {
        let mut record = self.load_for_write(caller, record_id).await?;
        record.set_visibility(is_public);

        let updated = self.persist(&record).await?;
        tracing::info!(record_id = %record_id, is_public, "Record visibility changed");
        Ok(updated)
    }

    pub async fn delete_record(&self, caller: &UserId, record_id: &RecordId) -> Result<()> {
        self.load_for_write(caller, record_id).await?;

        self.records.delete(record_id).await.map_err(|e| match e {
            RepositoryError::NotFound => not_found(record_id),
            other => {
                tracing::error!(error = %other, record_id = %record_id, "Failed to delete record");
                Error::from(other)
            }
        })?;

        tracing::info!(record_id = %record_id, user_id = %caller, "Record deleted");
        Ok(())
    }

    /// Read a record. Private records are visible to team MEMBERs only.
    pub async fn get_record(&self, caller: &UserId, record_id: &RecordId) -> Result<Record> {
        let record = self.load(record_id).await?;
        if !record.is_public {
            require_member(self.memberships.as_ref(), caller, &record.team_id).await?;
        }
        Ok(record)
    }

    /// A team's records: all of them for MEMBERs, only public ones otherwise
    pub async fn list_records(&self, caller: &UserId, team_id: &TeamId) -> Result<Vec<Record>> {
        load_team(self.teams.as_ref(), team_id).await?;

        let is_member = self.memberships.is_member(caller, team_id).await?;
        let records = self.records.find_by_team_id(team_id).await?;

        Ok(records
            .into_iter()
            .filter(|r| is_member || r.is_public)
            .collect())
    }

    /// Summaries of the records [`list_records`](Self::list_records) would return
    pub async fn list_record_indices(
        &self,
        caller: &UserId,
        team_id: &TeamId,
    ) -> Result<Vec<RecordIndex>> {
        let records = self.list_records(caller, team_id).await?;
        Ok(records.iter().map(RecordIndex::from).collect())
    }

    async fn load(&self, record_id: &RecordId) -> Result<Record> {
        self.records
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| not_found(record_id))
    }

    async fn load_for_write(&self, caller: &UserId, record_id: &RecordId) -> Result<Record> {
        let record = self.load(record_id).await?;
        require_member(self.memberships.as_ref(), caller, &record.team_id).await?;
        Ok(record)
    }

    async fn persist(&self, record: &Record) -> Result<Record> {
        self.records
            .update(record)
            .await
            .map_err(|e| persist_error(&record.id, e))
    }
}

fn persist_error(record_id: &RecordId, err: RepositoryError) -> Error {
    match err {
        RepositoryError::NotFound => not_found(record_id),
        RepositoryError::Stale => Error::Conflict(format!(
            "Record {} was modified concurrently; reload and retry",
            record_id
        )),
        other => {
            tracing::error!(error = %other, record_id = %record_id, "Failed to save record");
            Error::from(other)
        }
    }
}

fn not_found(record_id: &RecordId) -> Error {
    Error::NotFound(format!("Record {} not found", record_id))
}
