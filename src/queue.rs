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

//! Ranking of due items across both item kinds.

use std::cmp::Ordering;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::config::QueuePolicy;
use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::card_kind::ItemKind;
use crate::types::item::LearningItem;
use crate::types::item_id::ItemId;
use crate::types::timestamp::Timestamp;

/// Which items a queue or a review session holds.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueFilter {
    Flashcards,
    Questions,
    /// Both kinds, balanced.
    Mixed,
}

impl QueueFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueFilter::Flashcards => "flashcards",
            QueueFilter::Questions => "questions",
            QueueFilter::Mixed => "mixed",
        }
    }
}

impl TryFrom<String> for QueueFilter {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "flashcards" => Ok(QueueFilter::Flashcards),
            "questions" => Ok(QueueFilter::Questions),
            "mixed" => Ok(QueueFilter::Mixed),
            _ => fail(format!("invalid queue filter: {value}")),
        }
    }
}

impl ToSql for QueueFilter {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for QueueFilter {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        QueueFilter::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A due item with its computed urgency. Built per request, never stored.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub item_id: ItemId,
    pub item_kind: ItemKind,
    pub due: Timestamp,
    pub days_overdue: f64,
    pub mastery: f64,
    pub priority_score: f64,
}

pub struct Ranker {
    policy: QueuePolicy,
}

impl Ranker {
    pub fn new(policy: QueuePolicy) -> Self {
        Self { policy }
    }

    /// The priority score of an item that is `days_overdue` days late. The
    /// kind weight scales the overdue and mastery terms, never the ease term.
    pub fn score(&self, item: &LearningItem, days_overdue: f64) -> f64 {
        let p = &self.policy;
        let lapses = f64::from(item.schedule.lapses());
        let ease = item.schedule.ease().value();
        let weight = match item.kind() {
            ItemKind::Flashcard => 1.0,
            ItemKind::Question => p.question_weight,
        };
        weight
            * (days_overdue * (1.0 + lapses * p.lapse_weight)
                + (1.0 - item.mastery()) * p.mastery_weight)
            + (p.base_ease - ease) * p.ease_weight
    }

    /// Rank the items due at `now`, most urgent first. Items not yet due are
    /// left out.
    pub fn rank<'a, I>(&self, items: I, now: Timestamp) -> Vec<QueueEntry>
    where
        I: IntoIterator<Item = &'a LearningItem>,
    {
        let mut entries: Vec<QueueEntry> = items
            .into_iter()
            .filter(|item| item.schedule.is_due(now))
            .map(|item| {
                let days_overdue = now.days_since(item.schedule.due()).max(0.0);
                QueueEntry {
                    item_id: item.id,
                    item_kind: item.kind(),
                    due: item.schedule.due(),
                    days_overdue,
                    mastery: item.mastery(),
                    priority_score: self.score(item, days_overdue),
                }
            })
            .collect();
        entries.sort_by(compare_entries);
        entries
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(QueuePolicy::default())
    }
}

/// Rank with the default policy.
pub fn rank<'a, I>(items: I, now: Timestamp) -> Vec<QueueEntry>
where
    I: IntoIterator<Item = &'a LearningItem>,
{
    Ranker::default().rank(items, now)
}

/// Higher score first. Ties: flashcards before questions, then the earlier
/// due date, then the lower id.
fn compare_entries(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    b.priority_score
        .total_cmp(&a.priority_score)
        .then_with(|| a.item_kind.cmp(&b.item_kind))
        .then_with(|| a.due.cmp(&b.due))
        .then_with(|| a.item_id.cmp(&b.item_id))
}

/// Keep only entries of one kind, at most `limit` of them, in rank order.
pub fn filter_kind(entries: &[QueueEntry], kind: ItemKind, limit: usize) -> Vec<QueueEntry> {
    entries
        .iter()
        .filter(|entry| entry.item_kind == kind)
        .take(limit)
        .cloned()
        .collect()
}

/// A balanced queue: up to half of `limit` from each kind, alternating
/// flashcard and question, each side in rank order.
pub fn interleave(entries: &[QueueEntry], limit: usize) -> Vec<QueueEntry> {
    let half = limit / 2;
    let flashcards = filter_kind(entries, ItemKind::Flashcard, half);
    let questions = filter_kind(entries, ItemKind::Question, half);
    let mut mixed = Vec::with_capacity(flashcards.len() + questions.len());
    let mut flashcards = flashcards.into_iter();
    let mut questions = questions.into_iter();
    loop {
        let a = flashcards.next();
        let b = questions.next();
        if a.is_none() && b.is_none() {
            break;
        }
        mixed.extend(a);
        mixed.extend(b);
    }
    mixed.truncate(limit);
    mixed
}
