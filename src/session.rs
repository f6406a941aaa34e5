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

//! Building a bounded review session out of ranked due items and new items.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::SessionPolicy;
use crate::queue::QueueEntry;
use crate::types::card_kind::ItemKind;
use crate::types::item::LearningItem;
use crate::types::item_id::ItemId;

/// Why an item is in the session.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Due,
    New,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionItem {
    pub item_id: ItemId,
    pub item_kind: ItemKind,
    pub source: Source,
}

/// An ordered review session: due items in rank order, then new items.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    pub items: Vec<SessionItem>,
    pub due_count: usize,
    pub new_count: usize,
}

impl SessionPlan {
    /// Nothing to review.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

pub struct Composer {
    policy: SessionPolicy,
}

impl Composer {
    pub fn new(policy: SessionPolicy) -> Self {
        Self { policy }
    }

    /// How many new items may accompany `due_count` due items.
    pub fn new_quota(&self, due_count: usize) -> usize {
        if due_count == 0 {
            return 0;
        }
        let quota = (self.policy.new_ratio * due_count as f64).round() as usize;
        let quota = quota.max(1);
        match self.policy.max_new_per_session {
            Some(max) => quota.min(max),
            None => quota,
        }
    }

    /// Compose a session of at most `limit` items.
    ///
    /// New items are only those never reviewed and not already among the
    /// due entries. When there are due entries, at least one of them always
    /// makes it into a non-empty session; when there are none, the session is
    /// filled with new items.
    pub fn compose(
        &self,
        due_entries: &[QueueEntry],
        new_items: &[LearningItem],
        limit: usize,
    ) -> SessionPlan {
        let due_ids: HashSet<ItemId> = due_entries.iter().map(|e| e.item_id).collect();
        let mut seen: HashSet<ItemId> = HashSet::new();
        let fresh: Vec<&LearningItem> = new_items
            .iter()
            .filter(|item| item.is_new() && !due_ids.contains(&item.id))
            .filter(|item| seen.insert(item.id))
            .collect();

        let new_slots = if due_entries.is_empty() {
            let cap = self.policy.max_new_per_session.unwrap_or(usize::MAX);
            fresh.len().min(limit).min(cap)
        } else {
            // One slot stays reserved for a due item, so a session of one
            // holds no new items even though the quota is at least one.
            self.new_quota(due_entries.len())
                .min(fresh.len())
                .min(limit.saturating_sub(1))
        };
        let due_slots = due_entries.len().min(limit - new_slots);

        let mut items = Vec::with_capacity(due_slots + new_slots);
        items.extend(due_entries.iter().take(due_slots).map(|entry| SessionItem {
            item_id: entry.item_id,
            item_kind: entry.item_kind,
            source: Source::Due,
        }));
        items.extend(fresh.iter().take(new_slots).map(|item| SessionItem {
            item_id: item.id,
            item_kind: item.kind(),
            source: Source::New,
        }));
        log::debug!(
            "Composed session: {due_slots} due of {}, {new_slots} new of {}, limit {limit}",
            due_entries.len(),
            fresh.len()
        );
        SessionPlan {
            items,
            due_count: due_slots,
            new_count: new_slots,
        }
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(SessionPolicy::default())
    }
}

/// Compose with the default policy.
pub fn compose_session(
    due_entries: &[QueueEntry],
    new_items: &[LearningItem],
    limit: usize,
) -> SessionPlan {
    Composer::default().compose(due_entries, new_items, limit)
}
