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

//! Persistence of learning items and their review history.

mod memory;
mod sqlite;

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

pub use memory::MemoryRecorder;
pub use sqlite::SqliteRecorder;

use crate::error::ErrorReport;
use crate::queue::QueueFilter;
use crate::types::item::LearningItem;
use crate::types::item_id::ItemId;
use crate::types::review::ReviewEvent;
use crate::types::review::ReviewSubmission;
use crate::types::session_record::SessionId;
use crate::types::session_record::SessionRecord;
use crate::types::session_record::SessionSummary;
use crate::types::timestamp::Timestamp;
use crate::types::user::UserId;

/// Errors at the storage boundary.
#[derive(Debug, PartialEq)]
pub enum RecorderError {
    /// No item with this id belongs to the user.
    NotFound(ItemId),
    /// The user already has an item with this id.
    Duplicate(ItemId),
    /// The stored schedule no longer matches the state the review was
    /// computed from.
    Conflict(ItemId),
    /// No session with this id belongs to the user.
    SessionNotFound(SessionId),
    /// The session was already completed.
    SessionClosed(SessionId),
    /// The backing store failed.
    Storage(String),
}

impl Display for RecorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderError::NotFound(id) => write!(f, "item not found: {id}"),
            RecorderError::Duplicate(id) => write!(f, "item already exists: {id}"),
            RecorderError::Conflict(id) => {
                write!(f, "item {id} was modified by a concurrent review")
            }
            RecorderError::SessionNotFound(id) => write!(f, "session not found: {id}"),
            RecorderError::SessionClosed(id) => write!(f, "session {id} is already complete"),
            RecorderError::Storage(msg) => write!(f, "storage failure: {msg}"),
        }
    }
}

impl Error for RecorderError {}

impl From<RecorderError> for ErrorReport {
    fn from(value: RecorderError) -> Self {
        ErrorReport::new(value.to_string())
    }
}

impl From<rusqlite::Error> for RecorderError {
    fn from(value: rusqlite::Error) -> Self {
        RecorderError::Storage(value.to_string())
    }
}

impl From<serde_json::Error> for RecorderError {
    fn from(value: serde_json::Error) -> Self {
        RecorderError::Storage(format!("malformed item content: {value}"))
    }
}

impl From<ErrorReport> for RecorderError {
    fn from(value: ErrorReport) -> Self {
        RecorderError::Storage(value.message().to_string())
    }
}

pub type RecorderResult<T> = Result<T, RecorderError>;

/// A store of items and review events, partitioned by user.
///
/// Implementations serialize writes to the same item: `record_review` checks
/// the stored schedule against the submission's `pre` state and applies the
/// update in one critical section.
pub trait ReviewRecorder {
    /// Store a new item. Fails with `Duplicate` if the id is taken.
    fn insert_item(&self, user: &UserId, item: &LearningItem) -> RecorderResult<()>;

    fn get_item(&self, user: &UserId, id: ItemId) -> RecorderResult<LearningItem>;

    /// Every item of the user.
    fn items(&self, user: &UserId) -> RecorderResult<Vec<LearningItem>>;

    /// Flashcards due at `now`, earliest due first.
    fn due_flashcards(
        &self,
        user: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>>;

    /// Missed questions due at `now`, earliest due first.
    fn due_questions(
        &self,
        user: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>>;

    /// Never-reviewed flashcards, newest first.
    fn new_flashcards(&self, user: &UserId, count: usize) -> RecorderResult<Vec<LearningItem>>;

    /// Missed questions whose mastery is below `threshold`, weakest first.
    /// Never-reviewed questions count as mastery zero.
    fn weak_questions(
        &self,
        user: &UserId,
        threshold: f64,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>>;

        /// Review events at or after `since` (all events if `None`), oldest
    /// first.
    fn review_events(
        &self,
        user: &UserId,
        since: Option<Timestamp>,
    ) -> RecorderResult<Vec<ReviewEvent>>;

    /// Apply a review: replace the item's schedule with `post`, update its
    /// tally, and append exactly one event.
    fn record_review(
        &self,
        user: &UserId,
        submission: ReviewSubmission,
    ) -> RecorderResult<ReviewEvent>;

    /// Open a new review session.
    fn start_session(
        &self,
        user: &UserId,
        focus: QueueFilter,
        target_minutes: Option<u32>,
        now: Timestamp,
    ) -> RecorderResult<SessionRecord>;

    fn get_session(&self, user: &UserId, id: SessionId) -> RecorderResult<SessionRecord>;

    /// Close an open session with its summary. Fails with `SessionClosed` if
    /// it was closed already.
    fn complete_session(
        &self,
        user: &UserId,
        id: SessionId,
        summary: SessionSummary,
        now: Timestamp,
    ) -> RecorderResult<SessionRecord>;

    /// The user's sessions, most recently started first.
    fn sessions(&self, user: &UserId, limit: usize) -> RecorderResult<Vec<SessionRecord>>;
}

/// Apply `submission` to the stored `item`, or fail with `Conflict` if the
/// item moved on since the submission's `pre` state was read.
pub(crate) fn apply_review(
    item: &mut LearningItem,
    submission: ReviewSubmission,
) -> RecorderResult<ReviewEvent> {
    if item.schedule != submission.pre {
        return Err(RecorderError::Conflict(item.id));
    }
    item.schedule = submission.post.clone();
    item.tally = item
        .tally
        .record(submission.rating, submission.time_spent_secs);
    Ok(submission.into_event(item.kind()))
}

/// Behaviour every recorder must share, run against each backend.
#[cfg(test)]
pub(crate) mod suite {
    use super::*;
    use crate::helper::item_with;
    use crate::helper::new_card;
    use crate::helper::question_with;
    use crate::scheduler::schedule;
    use crate::types::card_kind::ItemKind;
    use crate::types::rating::Rating;

    pub fn now() -> Timestamp {
        Timestamp::parse("2025-09-10T12:00:00Z").unwrap()
    }

    pub fn user() -> UserId {
        UserId::new("alice").unwrap()
    }

    fn submission(item: &LearningItem, rating: Rating, at: Timestamp) -> ReviewSubmission {
        ReviewSubmission {
            item_id: item.id,
            rating,
            time_spent_secs: 12,
            pre: item.schedule.clone(),
            post: schedule(&item.schedule, rating, at),
            reviewed_at: at,
        }
    }

    pub fn insert_and_get<R: ReviewRecorder>(r: &R) {
        let card = new_card("front", now());
        r.insert_item(&user(), &card).unwrap();
        assert_eq!(r.get_item(&user(), card.id).unwrap(), card);
        assert_eq!(
            r.insert_item(&user(), &card),
            Err(RecorderError::Duplicate(card.id))
        );
        let bob = UserId::new("bob").unwrap();
        assert_eq!(
            r.get_item(&bob, card.id),
            Err(RecorderError::NotFound(card.id))
        );
        r.insert_item(&bob, &card).unwrap();
        assert_eq!(r.items(&user()).unwrap().len(), 1);
    }

    pub fn due_queries<R: ReviewRecorder>(r: &R) {
        let u = user();
        let late = item_with("late", 2.5, 0, now().minus_days(5));
        let recent = item_with("recent", 2.5, 0, now().minus_days(2));
        let future = item_with("future", 2.5, 0, now().plus_days(1));
        let question = question_with("q-1", 2.5, now().minus_days(3));
        let fresh = new_card("fresh", now().minus_days(1));
        let fresher = new_card("fresher", now());
        for item in [&recent, &future, &late, &question, &fresh, &fresher] {
            r.insert_item(&u, item).unwrap();
        }

        let due = r.due_flashcards(&u, now(), 10).unwrap();
        let ids: Vec<ItemId> = due.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![late.id, recent.id, fresh.id, fresher.id]);
        assert_eq!(r.due_flashcards(&u, now(), 1).unwrap().len(), 1);

        let questions = r.due_questions(&u, now(), 10).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].kind(), ItemKind::Question);

        let new = r.new_flashcards(&u, 10).unwrap();
        let ids: Vec<ItemId> = new.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![fresher.id, fresh.id]);
        assert_eq!(r.new_flashcards(&u, 1).unwrap().len(), 1);
    }

    pub fn record_review<R: ReviewRecorder>(r: &R) {
        let u = user();
        let card = new_card("front", now());
        r.insert_item(&u, &card).unwrap();

        let event = r
            .record_review(&u, submission(&card, Rating::Good, now()))
            .unwrap();
        assert_eq!(event.item_id, card.id);
        assert_eq!(event.item_kind, ItemKind::Flashcard);
        assert_eq!(event.after.interval, 1);

        let stored = r.get_item(&u, card.id).unwrap();
        assert_eq!(stored.schedule.repetitions(), 1);
        assert_eq!(stored.schedule.due(), now().plus_days(1));
        assert_eq!(stored.tally.total, 1);
        assert_eq!(stored.tally.correct, 1);

        let events = r.review_events(&u, None).unwrap();
        assert_eq!(events, vec![event]);
        assert!(r.review_events(&u, Some(now().plus_days(1))).unwrap().is_empty());
        assert!(r.new_flashcards(&u, 10).unwrap().is_empty());
    }

    pub fn stale_review_conflicts<R: ReviewRecorder>(r: &R) {
        let u = user();
        let card = new_card("front", now());
        r.insert_item(&u, &card).unwrap();
        let first = submission(&card, Rating::Good, now());
        let second = submission(&card, Rating::Again, now());
        r.record_review(&u, first).unwrap();
        assert_eq!(
            r.record_review(&u, second),
            Err(RecorderError::Conflict(card.id))
        );
        assert_eq!(r.review_events(&u, None).unwrap().len(), 1);
        assert_eq!(r.get_item(&u, card.id).unwrap().tally.total, 1);
    }

    pub fn weak_questions<R: ReviewRecorder>(r: &R) {
        let u = user();
        let mut shaky = question_with("q-shaky", 2.5, now());
        shaky.tally.total = 4;
        shaky.tally.correct = 1;
        let mut solid = question_with("q-solid", 2.5, now());
        solid.tally.total = 5;
        solid.tally.correct = 5;
        let mut middling = question_with("q-middling", 2.5, now());
        middling.tally.total = 2;
        middling.tally.correct = 1;
        let untried = question_with("q-untried", 2.5, now());
        let card = new_card("card", now());
        for item in [&shaky, &solid, &middling, &untried, &card] {
            r.insert_item(&u, item).unwrap();
        }
        let weak = r.weak_questions(&u, 0.7, 10).unwrap();
        let ids: Vec<ItemId> = weak.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![untried.id, shaky.id, middling.id]);
        assert_eq!(r.weak_questions(&u, 0.7, 2).unwrap().len(), 2);
        assert_eq!(r.weak_questions(&u, 0.5, 10).unwrap().len(), 2);
        let bob = UserId::new("bob").unwrap();
        assert!(r.weak_questions(&bob, 0.7, 10).unwrap().is_empty());
    }

    pub fn session_records<R: ReviewRecorder>(r: &R) {
        let u = user();
        let first = r
            .start_session(&u, QueueFilter::Mixed, Some(20), now())
            .unwrap();
        assert!(!first.is_completed());
        assert_eq!(first.summary, SessionSummary::default());
        assert_eq!(r.get_session(&u, first.id).unwrap(), first);
        let second = r
            .start_session(&u, QueueFilter::Questions, None, now().plus_days(1))
            .unwrap();
        assert_ne!(first.id, second.id);

        let summary = SessionSummary {
            flashcards_reviewed: 3,
            questions_reviewed: 1,
            correct_count: 2,
            total_count: 4,
            duration_secs: 600,
        };
        let done = r
            .complete_session(&u, first.id, summary, now().plus_days(1))
            .unwrap();
        assert_eq!(done.completed_at, Some(now().plus_days(1)));
        assert_eq!(done.summary, summary);
        assert_eq!(r.get_session(&u, first.id).unwrap(), done);
        assert_eq!(
            r.complete_session(&u, first.id, summary, now().plus_days(2)),
            Err(RecorderError::SessionClosed(first.id))
        );

        let listed = r.sessions(&u, 10).unwrap();
        assert_eq!(listed, vec![second.clone(), done]);
        assert_eq!(r.sessions(&u, 1).unwrap(), vec![second.clone()]);

        let bob = UserId::new("bob").unwrap();
        assert!(r.sessions(&bob, 10).unwrap().is_empty());
        assert_eq!(
            r.get_session(&bob, second.id),
            Err(RecorderError::SessionNotFound(second.id))
        );
        assert_eq!(
            r.complete_session(&bob, second.id, summary, now()),
            Err(RecorderError::SessionNotFound(second.id))
        );
    }

        pub fn review_missing_item<R: ReviewRecorder>(r: &R) {
        let card = new_card("ghost", now());
        assert_eq!(
            r.record_review(&user(), submission(&card, Rating::Good, now())),
            Err(RecorderError::NotFound(card.id))
        );
    }
}
