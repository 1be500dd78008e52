//! Partial update of a record

use chrono::{DateTime, Utc};
use serde::Deserialize;

use curlarc_common::FieldUpdate;

use crate::domain::entities::{DataPerEnd, MatchResult};

/// Fields a caller may change on an existing record; `Unset` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecordUpdate {
    pub result: FieldUpdate<MatchResult>,
    pub enemy_team_name: FieldUpdate<String>,
    pub place: FieldUpdate<String>,
    pub date: FieldUpdate<DateTime<Utc>>,
    pub ends_data: FieldUpdate<Vec<DataPerEnd>>,
    pub is_red: FieldUpdate<bool>,
    pub is_first: FieldUpdate<bool>,
    pub is_public: FieldUpdate<bool>,
}

impl RecordUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        !(self.result.is_set()
            || self.enemy_team_name.is_set()
            || self.place.is_set()
            || self.date.is_set()
            || self.ends_data.is_set()
            || self.is_red.is_set()
            || self.is_first.is_set()
            || self.is_public.is_set())
    }
}
