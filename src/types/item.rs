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

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::types::card_kind::CardKind;
use crate::types::card_kind::ItemKind;
use crate::types::item_id::ItemId;
use crate::types::rating::Rating;
use crate::types::schedule::ScheduleState;
use crate::types::timestamp::Timestamp;

/// A flashcard's text data.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// The content module this card belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default)]
    pub kind: CardKind,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into().trim().to_string(),
            back: back.into().trim().to_string(),
            ..Default::default()
        }
    }
}

/// An exam question the user previously answered wrong.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedQuestion {
    /// Reference to the question in the question bank.
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ItemContent {
    Flashcard(Flashcard),
    Question(MissedQuestion),
}

impl ItemContent {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemContent::Flashcard(_) => ItemKind::Flashcard,
            ItemContent::Question(_) => ItemKind::Question,
        }
    }

    pub fn id(&self) -> ItemId {
        match self {
            ItemContent::Flashcard(card) => ItemId::flashcard(card),
            ItemContent::Question(question) => ItemId::question(&question.question_id),
        }
    }
}

/// Running performance counters for an item.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub total: u32,
    pub correct: u32,
    pub avg_time_secs: f64,
}

impl Tally {
    /// Fraction of reviews recalled correctly, or zero if never reviewed.
    pub fn mastery(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }

    pub fn record(self, rating: Rating, time_spent_secs: u32) -> Self {
        let total = self.total + 1;
        let correct = self.correct + u32::from(rating.is_correct());
        let avg_time_secs = (self.avg_time_secs * f64::from(self.total)
            + f64::from(time_spent_secs))
            / f64::from(total);
        Self {
            total,
            correct,
            avg_time_secs,
        }
    }
}

/// A flashcard or missed question, with its scheduling state.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningItem {
    pub id: ItemId,
    pub content: ItemContent,
    pub schedule: ScheduleState,
    pub tally: Tally,
    pub created_at: Timestamp,
}

impl LearningItem {
    pub fn new(content: ItemContent, now: Timestamp) -> Self {
        Self {
            id: content.id(),
            content,
            schedule: ScheduleState::new(now),
            tally: Tally::default(),
            created_at: now,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }

    pub fn mastery(&self) -> f64 {
        self.tally.mastery()
    }

    pub fn is_new(&self) -> bool {
        self.schedule.is_new()
    }
}
