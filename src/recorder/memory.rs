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

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::recorder::RecorderError;
use crate::recorder::RecorderResult;
use crate::recorder::ReviewRecorder;
use crate::queue::QueueFilter;
use crate::recorder::apply_review;
use crate::types::card_kind::ItemKind;
use crate::types::item::LearningItem;
use crate::types::item_id::ItemId;
use crate::types::review::ReviewEvent;
use crate::types::review::ReviewSubmission;
use crate::types::session_record::SessionId;
use crate::types::session_record::SessionRecord;
use crate::types::session_record::SessionSummary;
use crate::types::timestamp::Timestamp;
use crate::types::user::UserId;

/// A recorder that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryRecorder {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    items: HashMap<(UserId, ItemId), LearningItem>,
    events: Vec<(UserId, ReviewEvent)>,
    sessions: Vec<(UserId, SessionRecord)>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> RecorderResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| RecorderError::Storage("memory store lock poisoned".to_string()))
    }

    fn due_of_kind(
        &self,
        user: &UserId,
        kind: ItemKind,
        now: Timestamp,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>> {
        let state = self.acquire()?;
        let mut due: Vec<LearningItem> = state
            .items
            .iter()
            .filter(|((owner, _), item)| {
                owner == user && item.kind() == kind && item.schedule.is_due(now)
            })
            .map(|(_, item)| item.clone())
            .collect();
        due.sort_by(|a, b| {
            a.schedule
                .due()
                .cmp(&b.schedule.due())
                .then_with(|| a.id.cmp(&b.id))
        });
        due.truncate(limit);
        Ok(due)
    }
}

impl ReviewRecorder for MemoryRecorder {
    fn insert_item(&self, user: &UserId, item: &LearningItem) -> RecorderResult<()> {
        let mut state = self.acquire()?;
        let key = (user.clone(), item.id);
        if state.items.contains_key(&key) {
            return Err(RecorderError::Duplicate(item.id));
        }
        log::debug!("Inserting item {} for {user}", item.id.short());
        state.items.insert(key, item.clone());
        Ok(())
    }

    fn get_item(&self, user: &UserId, id: ItemId) -> RecorderResult<LearningItem> {
        let state = self.acquire()?;
        state
            .items
            .get(&(user.clone(), id))
            .cloned()
            .ok_or(RecorderError::NotFound(id))
    }

    fn items(&self, user: &UserId) -> RecorderResult<Vec<LearningItem>> {
        let state = self.acquire()?;
        let mut items: Vec<LearningItem> = state
            .items
            .iter()
            .filter(|((owner, _), _)| owner == user)
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    fn due_flashcards(
        &self,
        user: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>> {
        self.due_of_kind(user, ItemKind::Flashcard, now, limit)
    }

    fn due_questions(
        &self,
        user: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>> {
        self.due_of_kind(user, ItemKind::Question, now, limit)
    }

    fn new_flashcards(&self, user: &UserId, count: usize) -> RecorderResult<Vec<LearningItem>> {
        let state = self.acquire()?;
        let mut new: Vec<LearningItem> = state
            .items
            .iter()
            .filter(|((owner, _), item)| {
                owner == user && item.kind() == ItemKind::Flashcard && item.is_new()
            })
            .map(|(_, item)| item.clone())
            .collect();
        new.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        new.truncate(count);
        Ok(new)
    }

    fn weak_questions(
        &self,
        user: &UserId,
        threshold: f64,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>> {
        let state = self.acquire()?;
        let mut weak: Vec<LearningItem> = state
            .items
            .iter()
            .filter(|((owner, _), item)| {
                owner == user && item.kind() == ItemKind::Question && item.mastery() < threshold
            })
            .map(|(_, item)| item.clone())
            .collect();
        weak.sort_by(|a, b| a.mastery().total_cmp(&b.mastery()).then_with(|| a.id.cmp(&b.id)));
        weak.truncate(limit);
        Ok(weak)
    }

    fn review_events(
        &self,
        user: &UserId,
        since: Option<Timestamp>,
    ) -> RecorderResult<Vec<ReviewEvent>> {
        let state = self.acquire()?;
        let mut events: Vec<ReviewEvent> = state
            .events
            .iter()
            .filter(|(owner, event)| {
                owner == user && since.is_none_or(|since| event.reviewed_at >= since)
            })
            .map(|(_, event)| event.clone())
            .collect();
        events.sort_by_key(|event| event.reviewed_at);
        Ok(events)
    }

    fn record_review(
        &self,
        user: &UserId,
        submission: ReviewSubmission,
    ) -> RecorderResult<ReviewEvent> {
        let mut state = self.acquire()?;
        let id = submission.item_id;
        let item = state
            .items
            .get_mut(&(user.clone(), id))
            .ok_or(RecorderError::NotFound(id))?;
        let event = apply_review(item, submission)?;
        state.events.push((user.clone(), event.clone()));
        Ok(event)
    }

    fn start_session(
        &self,
        user: &UserId,
        focus: QueueFilter,
        target_minutes: Option<u32>,
        now: Timestamp,
    ) -> RecorderResult<SessionRecord> {
        let mut state = self.acquire()?;
        let next = i64::try_from(state.sessions.len())
            .map_err(|_| RecorderError::Storage("too many sessions".to_string()))?
            + 1;
        let record = SessionRecord {
            id: SessionId::new(next),
            focus,
            target_minutes,
            started_at: now,
            completed_at: None,
            summary: SessionSummary::default(),
        };
        state.sessions.push((user.clone(), record.clone()));
        Ok(record)
    }

    fn get_session(&self, user: &UserId, id: SessionId) -> RecorderResult<SessionRecord> {
        let state = self.acquire()?;
        state
            .sessions
            .iter()
            .find(|(owner, record)| owner == user && record.id == id)
            .map(|(_, record)| record.clone())
            .ok_or(RecorderError::SessionNotFound(id))
    }

    fn complete_session(
        &self,
        user: &UserId,
        id: SessionId,
        summary: SessionSummary,
        now: Timestamp,
    ) -> RecorderResult<SessionRecord> {
        let mut state = self.acquire()?;
        let record = state
            .sessions
            .iter_mut()
            .find(|(owner, record)| owner == user && record.id == id)
            .map(|(_, record)| record)
            .ok_or(RecorderError::SessionNotFound(id))?;
        if record.is_completed() {
            return Err(RecorderError::SessionClosed(id));
        }
        record.completed_at = Some(now);
        record.summary = summary;
        Ok(record.clone())
    }

    fn sessions(&self, user: &UserId, limit: usize) -> RecorderResult<Vec<SessionRecord>> {
        let state = self.acquire()?;
        let mut sessions: Vec<SessionRecord> = state
            .sessions
            .iter()
            .filter(|(owner, _)| owner == user)
            .map(|(_, record)| record.clone())
            .collect();
        sessions.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        sessions.truncate(limit);
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::suite;

    #[test]
    fn test_insert_and_get() {
        suite::insert_and_get(&MemoryRecorder::new());
    }

    #[test]
    fn test_due_queries() {
        suite::due_queries(&MemoryRecorder::new());
    }

    #[test]
    fn test_record_review() {
        suite::record_review(&MemoryRecorder::new());
    }

    #[test]
    fn test_stale_review_conflicts() {
        suite::stale_review_conflicts(&MemoryRecorder::new());
    }

    #[test]
    fn test_review_missing_item() {
        suite::review_missing_item(&MemoryRecorder::new());
    }

    #[test]
    fn test_weak_questions() {
        suite::weak_questions(&MemoryRecorder::new());
    }

    #[test]
    fn test_session_records() {
        suite::session_records(&MemoryRecorder::new());
    }

    #[test]
    fn test_shared_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let recorder = Arc::new(MemoryRecorder::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    let card = crate::helper::new_card(&format!("card {i}"), suite::now());
                    recorder.insert_item(&suite::user(), &card)
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(recorder.items(&suite::user()).unwrap().len(), 4);
    }
}
