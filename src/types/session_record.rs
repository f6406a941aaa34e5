// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::queue::QueueFilter;
use crate::types::card_kind::ItemKind;
use crate::types::review::ReviewEvent;
use crate::types::timestamp::Timestamp;

/// Sequential identifier of a review session, unique per store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| ErrorReport::new(format!("invalid session id: {s}")))
    }
}

impl ToSql for SessionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for SessionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// What happened during a session, counted from the review log.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub flashcards_reviewed: u32,
    pub questions_reviewed: u32,
    pub correct_count: u32,
    pub total_count: u32,
    pub duration_secs: u32,
}

impl SessionSummary {
    /// Count the events reviewed in `[started_at, completed_at]`.
    pub fn tally(events: &[ReviewEvent], started_at: Timestamp, completed_at: Timestamp) -> Self {
        let mut summary = Self {
            duration_secs: completed_at.seconds_since(started_at),
            ..Self::default()
        };
        let window = events
            .iter()
            .filter(|e| e.reviewed_at >= started_at && e.reviewed_at <= completed_at);
        for event in window {
            match event.item_kind {
                ItemKind::Flashcard => summary.flashcards_reviewed += 1,
                ItemKind::Question => summary.questions_reviewed += 1,
            }
            if event.rating.is_correct() {
                summary.correct_count += 1;
            }
            summary.total_count += 1;
        }
        summary
    }
}

/// A review session as stored: open until `completed_at` is set.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub focus: QueueFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_minutes: Option<u32>,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    /// All zero while the session is open.
    pub summary: SessionSummary,
}

impl SessionRecord {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}
