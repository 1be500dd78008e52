//! In-memory storage backend
//!
//! `MemoryStore` implements every repository trait of the teams and records
//! domains over one set of tables guarded by a single lock. Each trait call
//! takes the lock once, so uniqueness checks, compare-and-set transitions
//! and cascading deletes are atomic with respect to each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use curlarc_common::{RecordId, RepoResult, RepositoryError, TeamId, UserId};
use curlarc_records::{Record, RecordRepository};
use curlarc_teams::{
    Membership, MembershipRepository, MembershipState, Team, TeamRepository, User, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    teams: HashMap<TeamId, Team>,
    memberships: HashMap<(UserId, TeamId), Membership>,
    records: HashMap<RecordId, Record>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<&UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(&u.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail with a backend error until switched off
    pub fn set_write_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Backend("store lock poisoned".to_string()))
    }

    fn lock_for_write(&self) -> RepoResult<MutexGuard<'_, Tables>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            tracing::warn!("Rejecting write: store is failing writes");
            return Err(RepositoryError::Backend("store is unavailable".to_string()));
        }
        self.lock()
    }
}

fn sorted_by_creation<T, K: Ord + Copy>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn save(&self, user: &User) -> RepoResult<User> {
        let mut tables = self.lock_for_write()?;
        if tables.users.contains_key(&user.id) || tables.email_taken(&user.email, None) {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: &UserId) -> RepoResult<Option<User>> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users = self.lock()?.users.values().cloned().collect();
        Ok(sorted_by_creation(users, |u: &User| u.created_at))
    }

    async fn update(&self, user: &User) -> RepoResult<User> {
        let mut tables = self.lock_for_write()?;
        if !tables.users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.email_taken(&user.email, Some(&user.id)) {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> RepoResult<()> {
        let mut tables = self.lock_for_write()?;
        if tables.users.remove(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        tables.memberships.retain(|(user_id, _), _| user_id != id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl TeamRepository for MemoryStore {
    async fn save(&self, team: &Team) -> RepoResult<Team> {
        let mut tables = self.lock_for_write()?;
        if tables.teams.contains_key(&team.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.teams.insert(team.id.clone(), team.clone());
        Ok(team.clone())
    }

    async fn find_by_id(&self, id: &TeamId) -> RepoResult<Option<Team>> {
        Ok(self.lock()?.teams.get(id).cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<Team>> {
        let teams = self.lock()?.teams.values().cloned().collect();
        Ok(sorted_by_creation(teams, |t: &Team| t.created_at))
    }

    async fn update(&self, team: &Team) -> RepoResult<Team> {
        let mut tables = self.lock_for_write()?;
        match tables.teams.get_mut(&team.id) {
            Some(stored) => {
                *stored = team.clone();
                Ok(team.clone())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: &TeamId) -> RepoResult<()> {
        let mut tables = self.lock_for_write()?;
        if tables.teams.remove(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        tables.memberships.retain(|(_, team_id), _| team_id != id);
        tables.records.retain(|_, record| &record.team_id != id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl MembershipRepository for MemoryStore {
    async fn save(&self, membership: &Membership) -> RepoResult<Membership> {
        let mut tables = self.lock_for_write()?;
        if !tables.users.contains_key(&membership.user_id)
            || !tables.teams.contains_key(&membership.team_id)
        {
            return Err(RepositoryError::NotFound);
        }

        let key = (membership.user_id.clone(), membership.team_id.clone());
        if tables.memberships.contains_key(&key) {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.memberships.insert(key, membership.clone());
        Ok(membership.clone())
    }

    async fn find(&self, user_id: &UserId, team_id: &TeamId) -> RepoResult<Option<Membership>> {
        Ok(self
            .lock()?
            .memberships
            .get(&(user_id.clone(), team_id.clone()))
            .cloned())
    }

    async fn update_state(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
        expected: MembershipState,
        next: MembershipState,
    ) -> RepoResult<Membership> {
        let mut tables = self.lock_for_write()?;
        match tables.memberships.get_mut(&(user_id.clone(), team_id.clone())) {
            Some(row) if row.state == expected => {
                row.state = next;
                row.updated_at = Utc::now();
                Ok(row.clone())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, user_id: &UserId, team_id: &TeamId) -> RepoResult<()> {
        let mut tables = self.lock_for_write()?;
        tables
            .memberships
            .remove(&(user_id.clone(), team_id.clone()))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn is_member(&self, user_id: &UserId, team_id: &TeamId) -> RepoResult<bool> {
        Ok(self
            .lock()?
            .memberships
            .get(&(user_id.clone(), team_id.clone()))
            .is_some_and(Membership::is_member))
    }

    async fn team_ids_of(&self, user_id: &UserId) -> RepoResult<Vec<TeamId>> {
        self.select(|m| &m.user_id == user_id && m.is_member(), |m| m.team_id.clone())
    }

    async fn invited_team_ids_of(&self, user_id: &UserId) -> RepoResult<Vec<TeamId>> {
        self.select(|m| &m.user_id == user_id && m.is_invited(), |m| m.team_id.clone())
    }

    async fn member_ids_of(&self, team_id: &TeamId) -> RepoResult<Vec<UserId>> {
        self.select(|m| &m.team_id == team_id && m.is_member(), |m| m.user_id.clone())
    }

    async fn related_user_ids_of(&self, team_id: &TeamId) -> RepoResult<Vec<UserId>> {
        self.select(|m| &m.team_id == team_id, |m| m.user_id.clone())
    }
}

impl MemoryStore {
    /// Project matching membership rows, oldest first
    fn select<T>(
        &self,
        filter: impl Fn(&Membership) -> bool,
        project: impl Fn(&Membership) -> T,
    ) -> RepoResult<Vec<T>> {
        let tables = self.lock()?;
        let rows: Vec<&Membership> = tables.memberships.values().filter(|&m| filter(m)).collect();
        Ok(sorted_by_creation(rows, |m: &&Membership| m.created_at)
            .into_iter()
            .map(project)
            .collect())
    }
}

#[async_trait::async_trait]
impl RecordRepository for MemoryStore {
    async fn save(&self, record: &Record) -> RepoResult<Record> {
        let mut tables = self.lock_for_write()?;
        if !tables.teams.contains_key(&record.team_id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.records.contains_key(&record.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.records.insert(record.id.clone(), record.clone());
        Ok(record.clone())
    }

    async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Record>> {
        Ok(self.lock()?.records.get(id).cloned())
    }

    async fn find_by_team_id(&self, team_id: &TeamId) -> RepoResult<Vec<Record>> {
        let records = self
            .lock()?
            .records
            .values()
            .filter(|r| &r.team_id == team_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(records, |r: &Record| r.created_at))
    }

    async fn update(&self, record: &Record) -> RepoResult<Record> {
        let mut tables = self.lock_for_write()?;
        match tables.records.get_mut(&record.id) {
            Some(stored) if stored.version == record.version => {
                *stored = Record {
                    version: record.version + 1,
                    ..record.clone()
                };
                Ok(stored.clone())
            }
            Some(_) => Err(RepositoryError::Stale),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let mut tables = self.lock_for_write()?;
        tables
            .records
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
