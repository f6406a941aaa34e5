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

use serde::Serialize;

use crate::types::card_kind::ItemKind;
use crate::types::item_id::ItemId;
use crate::types::rating::Rating;
use crate::types::schedule::Ease;
use crate::types::schedule::ScheduleState;
use crate::types::timestamp::Timestamp;

/// The ease and interval of an item at one point in time.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Snapshot {
    pub ease: Ease,
    pub interval: u32,
}

impl From<&ScheduleState> for Snapshot {
    fn from(state: &ScheduleState) -> Self {
        Self {
            ease: state.ease(),
            interval: state.interval(),
        }
    }
}

/// A graded review, as logged by the recorder. Never modified once written.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub item_id: ItemId,
    pub item_kind: ItemKind,
    pub rating: Rating,
    pub time_spent_secs: u32,
    pub before: Snapshot,
    pub after: Snapshot,
    pub reviewed_at: Timestamp,
}

/// What the caller hands to the recorder after scheduling a review.
#[derive(Clone, Debug)]
pub struct ReviewSubmission {
    pub item_id: ItemId,
    pub rating: Rating,
    pub time_spent_secs: u32,
    /// The state the rating was applied to. Must match the stored state.
    pub pre: ScheduleState,
    pub post: ScheduleState,
    pub reviewed_at: Timestamp,
}

impl ReviewSubmission {
    pub fn into_event(self, item_kind: ItemKind) -> ReviewEvent {
        ReviewEvent {
            item_id: self.item_id,
            item_kind,
            rating: self.rating,
            time_spent_secs: self.time_spent_secs,
            before: Snapshot::from(&self.pre),
            after: Snapshot::from(&self.post),
            reviewed_at: self.reviewed_at,
        }
    }
}
