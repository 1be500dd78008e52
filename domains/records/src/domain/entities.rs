//! Domain entities for the records domain
//!
//! A [`Record`] is one curling match played by a team. Its ends are stored
//! in play order; every end holds exactly [`SHOTS_PER_END`] shots.
//! Mutations validate first and only then write, so a rejected call leaves
//! the record untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use curlarc_common::{Error, FieldUpdate, RecordId, Result, TeamId};

use crate::domain::update::RecordUpdate;

/// Shots thrown in one end (4 players x 2 stones)
pub const SHOTS_PER_END: usize = 8;

/// Stone position in polar form relative to the centre of the house
///
/// Indices are not required to be unique.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub index: i32,
    pub r: f64,
    pub theta: f64,
}

/// Stones in play after a shot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stones {
    pub friend_stones: Vec<Coordinate>,
    pub enemy_stones: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// Shot type, e.g. draw, guard, takeout
    #[serde(rename = "type")]
    pub shot_type: String,
    pub success_rate: f64,
    pub shooter: String,
    pub stones: Stones,
}

/// One end: its score and the shots thrown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPerEnd {
    pub score: i32,
    pub shots: Vec<Shot>,
}

/// Match outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchResult {
    Win,
    Lose,
    Draw,
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::Win => write!(f, "WIN"),
            MatchResult::Lose => write!(f, "LOSE"),
            MatchResult::Draw => write!(f, "DRAW"),
        }
    }
}

/// Optional fields supplied when a record is created
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub result: Option<MatchResult>,
    #[serde(default)]
    pub enemy_team_name: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Match record entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub team_id: TeamId,
    pub result: Option<MatchResult>,
    pub enemy_team_name: String,
    pub place: String,
    pub date: Option<DateTime<Utc>>,
    pub ends_data: Vec<DataPerEnd>,
    /// Team threw red stones
    pub is_red: bool,
    /// Team threw the first stone of the match
    pub is_first: bool,
    pub is_public: bool,
    /// Bumped by the store on every successful update
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary of a record for team listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIndex {
    pub id: RecordId,
    pub result: Option<MatchResult>,
    pub enemy_team_name: String,
    pub place: String,
    pub date: Option<DateTime<Utc>>,
}

impl From<&Record> for RecordIndex {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            result: record.result,
            enemy_team_name: record.enemy_team_name.clone(),
            place: record.place.clone(),
            date: record.date,
        }
    }
}

impl Record {
    /// Create a private record with no ends
    pub fn create(team_id: TeamId, options: NewRecord) -> Result<Self> {
        if let Some(date) = options.date {
            validate_date(date, Utc::now())?;
        }

        let now = Utc::now();
        Ok(Record {
            id: RecordId::generate(),
            team_id,
            result: options.result,
            enemy_team_name: options.enemy_team_name.unwrap_or_default(),
            place: options.place.unwrap_or_default(),
            date: options.date,
            ends_data: Vec::new(),
            is_red: false,
            is_first: false,
            is_public: false,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Set the match date. Future dates are rejected.
    pub fn set_date(&mut self, date: DateTime<Utc>) -> Result<()> {
        validate_date(date, Utc::now())?;
        self.date = Some(date);
        self.touch();
        Ok(())
    }

    /// Replace all ends
    pub fn set_ends_data(&mut self, ends: Vec<DataPerEnd>) -> Result<()> {
        validate_ends_data(&ends)?;
        self.ends_data = ends;
        self.touch();
        Ok(())
    }

    /// Append ends after the ones already recorded
    pub fn append_ends_data(&mut self, ends: Vec<DataPerEnd>) -> Result<()> {
        validate_ends_data(&ends)?;
        self.ends_data.extend(ends);
        self.touch();
        Ok(())
    }

    pub fn set_result(&mut self, result: MatchResult) {
        self.result = Some(result);
        self.touch();
    }

    pub fn set_enemy_team_name(&mut self, name: String) {
        self.enemy_team_name = name;
        self.touch();
    }

    pub fn set_place(&mut self, place: String) {
        self.place = place;
        self.touch();
    }

    pub fn set_visibility(&mut self, is_public: bool) {
        self.is_public = is_public;
        self.touch();
    }

    /// Apply a partial update. Either every supplied field is written or,
    /// if any of them is invalid, none is.
    pub fn apply_update(&mut self, update: RecordUpdate) -> Result<()> {
        let now = Utc::now();
        if let FieldUpdate::Set(date) = &update.date {
            validate_date(*date, now)?;
        }
        if let FieldUpdate::Set(ends) = &update.ends_data {
            validate_ends_data(ends)?;
        }

        if let FieldUpdate::Set(result) = update.result {
            self.result = Some(result);
        }
        update.enemy_team_name.apply_to(&mut self.enemy_team_name);
        update.place.apply_to(&mut self.place);
        if let FieldUpdate::Set(date) = update.date {
            self.date = Some(date);
        }
        update.ends_data.apply_to(&mut self.ends_data);
        update.is_red.apply_to(&mut self.is_red);
        update.is_first.apply_to(&mut self.is_first);
        update.is_public.apply_to(&mut self.is_public);
        self.updated_at = now;
        Ok(())
    }

    #[mutants::skip] // Delegates to RecordIndex::from
    pub fn index(&self) -> RecordIndex {
        RecordIndex::from(self)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Reject dates strictly after `now`
pub fn validate_date(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if date > now {
        return Err(Error::InvalidDate(
            "the match date cannot be in the future".to_string(),
        ));
    }
    Ok(())
}

/// Check every end has exactly [`SHOTS_PER_END`] shots with a success rate in [0, 1]
pub fn validate_ends_data(ends: &[DataPerEnd]) -> Result<()> {
    for (i, end) in ends.iter().enumerate() {
        if end.shots.len() != SHOTS_PER_END {
            return Err(Error::InvalidEndsData(format!(
                "end {} has {} shots; each end must contain exactly {}",
                i + 1,
                end.shots.len(),
                SHOTS_PER_END
            )));
        }

        for (j, shot) in end.shots.iter().enumerate() {
            if !shot.success_rate.is_finite() || !(0.0..=1.0).contains(&shot.success_rate) {
                return Err(Error::InvalidEndsData(format!(
                    "end {} shot {}: success rate {} is outside [0, 1]",
                    i + 1,
                    j + 1,
                    shot.success_rate
                )));
            }
        }
    }
    Ok(())
}
