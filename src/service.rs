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

//! The review service ties the scheduling core to a recorder.

use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::queue::QueueEntry;
use crate::queue::QueueFilter;
use crate::queue::Ranker;
use crate::queue::filter_kind;
use crate::queue::interleave;
use crate::recorder::RecorderError;
use crate::recorder::ReviewRecorder;
use crate::scheduler::Scheduler;
use crate::session::Composer;
use crate::session::SessionPlan;
use crate::stats::Aggregator;
use crate::stats::Stats;
use crate::types::card_kind::ItemKind;
use crate::types::item::Flashcard;
use crate::types::item::ItemContent;
use crate::types::item::LearningItem;
use crate::types::item::MissedQuestion;
use crate::types::item_id::ItemId;
use crate::types::rating::Rating;
use crate::types::review::ReviewEvent;
use crate::types::review::ReviewSubmission;
use crate::types::session_record::SessionId;
use crate::types::session_record::SessionRecord;
use crate::types::session_record::SessionSummary;
use crate::types::timestamp::Timestamp;
use crate::types::user::UserId;

/// Attempts at recording a review before giving up on a conflict.
const MAX_ATTEMPTS: usize = 3;

pub struct ReviewService<R: ReviewRecorder> {
    recorder: R,
    config: Config,
    scheduler: Scheduler,
    ranker: Ranker,
    composer: Composer,
    aggregator: Aggregator,
}

impl<R: ReviewRecorder> ReviewService<R> {
    pub fn new(recorder: R, config: Config) -> Self {
        Self {
            scheduler: Scheduler::new(config.scheduler.clone()),
            ranker: Ranker::new(config.queue.clone()),
            composer: Composer::new(config.session.clone()),
            aggregator: Aggregator::new(config.stats.clone()),
            recorder,
            config,
        }
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn item(&self, user: &UserId, id: ItemId) -> Fallible<LearningItem> {
        Ok(self.recorder.get_item(user, id)?)
    }

    /// Start tracking a flashcard. Adding the same card twice is an error.
    pub fn add_flashcard(
        &self,
        user: &UserId,
        card: Flashcard,
        now: Timestamp,
    ) -> Fallible<LearningItem> {
        if card.front.trim().is_empty() {
            return fail("flashcard front must not be empty");
        }
        if card.back.trim().is_empty() {
            return fail("flashcard back must not be empty");
        }
        let item = LearningItem::new(ItemContent::Flashcard(card), now);
        self.recorder.insert_item(user, &item)?;
        log::info!("Added flashcard {} for {user}", item.id.short());
        Ok(item)
    }

    /// Start tracking a missed question, or return the item already tracking
    /// it.
    pub fn add_missed_question(
        &self,
        user: &UserId,
        question: MissedQuestion,
        now: Timestamp,
    ) -> Fallible<LearningItem> {
        if question.question_id.trim().is_empty() {
            return fail("question id must not be empty");
        }
        let item = LearningItem::new(ItemContent::Question(question), now);
        match self.recorder.get_item(user, item.id) {
            Ok(existing) => {
                log::debug!("Question {} is already tracked.", item.id.short());
                return Ok(existing);
            }
            Err(RecorderError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        match self.recorder.insert_item(user, &item) {
            Ok(()) => {
                log::info!("Tracking missed question {} for {user}", item.id.short());
                Ok(item)
            }
            // Someone else added it in between.
            Err(RecorderError::Duplicate(id)) => Ok(self.recorder.get_item(user, id)?),
            Err(e) => Err(e.into()),
        }
    }

    /// Rate an item and persist the outcome.
    pub fn submit_review(
        &self,
        user: &UserId,
        item_id: ItemId,
        rating: Rating,
        time_spent_secs: u32,
        now: Timestamp,
    ) -> Fallible<ReviewEvent> {
        self.record_with(user, item_id, time_spent_secs, now, |_| Ok(rating))
    }

    /// Record an attempt at a tracked question. The rating follows from
    /// correctness and the question's track record.
    pub fn answer_question(
        &self,
        user: &UserId,
        item_id: ItemId,
        is_correct: bool,
        time_spent_secs: u32,
        now: Timestamp,
    ) -> Fallible<ReviewEvent> {
        self.record_with(user, item_id, time_spent_secs, now, |item| {
            if item.kind() != ItemKind::Question {
                return fail(format!("item {} is not a question", item.id));
            }
            Ok(Rating::from_answer(
                is_correct,
                item.mastery(),
                item.schedule.repetitions(),
            ))
        })
    }

    /// Read the item, schedule it, and record the review. On a conflict the
    /// whole cycle runs again against the fresh state.
    fn record_with<F>(
        &self,
        user: &UserId,
        item_id: ItemId,
        time_spent_secs: u32,
        now: Timestamp,
        rate: F,
    ) -> Fallible<ReviewEvent>
    where
        F: Fn(&LearningItem) -> Fallible<Rating>,
    {
        for attempt in 1..=MAX_ATTEMPTS {
            let item = self.recorder.get_item(user, item_id)?;
            let rating = rate(&item)?;
            let post = self.scheduler.schedule(&item.schedule, rating, now);
            let submission = ReviewSubmission {
                item_id,
                rating,
                time_spent_secs,
                pre: item.schedule,
                post,
                reviewed_at: now,
            };
            match self.recorder.record_review(user, submission) {
                Ok(event) => {
                    log::info!(
                        "Reviewed {} as {}: next in {}d",
                        item_id.short(),
                        rating,
                        event.after.interval
                    );
                    return Ok(event);
                }
                Err(RecorderError::Conflict(_)) => {
                    log::warn!(
                        "Concurrent update to {} (attempt {attempt} of {MAX_ATTEMPTS}).",
                        item_id.short()
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(RecorderError::Conflict(item_id).into())
    }

    /// The due items, most urgent first.
    pub fn queue(
        &self,
        user: &UserId,
        filter: QueueFilter,
        limit: usize,
        now: Timestamp,
    ) -> Fallible<Vec<QueueEntry>> {
        let queue = match filter {
            QueueFilter::Flashcards => {
                let items = self.recorder.due_flashcards(user, now, usize::MAX)?;
                filter_kind(&self.ranker.rank(&items, now), ItemKind::Flashcard, limit)
            }
            QueueFilter::Questions => {
                let items = self.recorder.due_questions(user, now, usize::MAX)?;
                filter_kind(&self.ranker.rank(&items, now), ItemKind::Question, limit)
            }
            QueueFilter::Mixed => interleave(&self.ranked_due(user, now)?, limit),
        };
        Ok(queue)
    }

    /// Plan a session of at most `limit` items, or the configured default.
    pub fn session(
        &self,
        user: &UserId,
        limit: Option<usize>,
        now: Timestamp,
    ) -> Fallible<SessionPlan> {
        let limit = limit.unwrap_or(self.config.session.default_limit);
        let flashcards = self.recorder.due_flashcards(user, now, usize::MAX)?;
        let questions = self.recorder.due_questions(user, now, usize::MAX)?;
        // Unseen flashcards only enter through the new-item quota.
        let reviewed = flashcards.iter().filter(|item| !item.is_new());
        let due = self.ranker.rank(reviewed.chain(questions.iter()), now);
        let new_items = self.recorder.new_flashcards(user, limit)?;
        Ok(self.composer.compose(&due, &new_items, limit))
    }

    /// Missed questions with mastery below `threshold`, weakest first.
    pub fn weak_questions(
        &self,
        user: &UserId,
        threshold: f64,
        limit: usize,
    ) -> Fallible<Vec<LearningItem>> {
        if !(0.0..=1.0).contains(&threshold) {
            return fail("mastery threshold must be between 0 and 1");
        }
        Ok(self.recorder.weak_questions(user, threshold, limit)?)
    }

    pub fn start_session(
        &self,
        user: &UserId,
        focus: QueueFilter,
        target_minutes: Option<u32>,
        now: Timestamp,
    ) -> Fallible<SessionRecord> {
        let record = self
            .recorder
            .start_session(user, focus, target_minutes, now)?;
        log::info!("Started {} session {} for {user}", focus.as_str(), record.id);
        Ok(record)
    }

    /// Close a session. Its summary counts the reviews logged between its
    /// start and `now`.
    pub fn complete_session(
        &self,
        user: &UserId,
        id: SessionId,
        now: Timestamp,
    ) -> Fallible<SessionRecord> {
        let record = self.recorder.get_session(user, id)?;
        if record.is_completed() {
            return Err(RecorderError::SessionClosed(id).into());
        }
        if now < record.started_at {
            return fail(format!("session {id} cannot end before it started"));
        }
        let events = self.recorder.review_events(user, Some(record.started_at))?;
        let summary = SessionSummary::tally(&events, record.started_at, now);
        let record = self.recorder.complete_session(user, id, summary, now)?;
        log::info!(
            "Completed session {id}: {} of {} correct",
            summary.correct_count,
            summary.total_count
        );
        Ok(record)
    }

    /// Past and open sessions, most recent first.
    pub fn sessions(&self, user: &UserId, limit: usize) -> Fallible<Vec<SessionRecord>> {
        Ok(self.recorder.sessions(user, limit)?)
    }

    pub fn stats(&self, user: &UserId, now: Timestamp) -> Fallible<Stats> {
        let items = self.recorder.items(user)?;
        let events = self.recorder.review_events(user, None)?;
        Ok(self.aggregator.summarize(&items, &events, now))
    }

    fn ranked_due(&self, user: &UserId, now: Timestamp) -> Fallible<Vec<QueueEntry>> {
        let flashcards = self.recorder.due_flashcards(user, now, usize::MAX)?;
        let questions = self.recorder.due_questions(user, now, usize::MAX)?;
        Ok(self.ranker.rank(flashcards.iter().chain(questions.iter()), now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::MemoryRecorder;
    use crate::session::Source;

    fn now() -> Timestamp {
        Timestamp::parse("2025-09-10T12:00:00Z").unwrap()
    }

    fn user() -> UserId {
        UserId::new("alice").unwrap()
    }

    fn service() -> ReviewService<MemoryRecorder> {
        ReviewService::new(MemoryRecorder::new(), Config::default())
    }

    fn question(id: &str) -> MissedQuestion {
        MissedQuestion {
            question_id: id.to_string(),
            domain: Some("sensors".to_string()),
        }
    }

    /// A recorder whose first `failures` submissions lose to a concurrent
    /// writer.
    struct Contended {
        inner: MemoryRecorder,
        failures: std::sync::Mutex<usize>,
    }

    impl ReviewRecorder for Contended {
        fn insert_item(&self, user: &UserId, item: &LearningItem) -> Result<(), RecorderError> {
            self.inner.insert_item(user, item)
        }

        fn get_item(&self, user: &UserId, id: ItemId) -> Result<LearningItem, RecorderError> {
            self.inner.get_item(user, id)
        }

        fn items(&self, user: &UserId) -> Result<Vec<LearningItem>, RecorderError> {
            self.inner.items(user)
        }

        fn due_flashcards(
            &self,
            user: &UserId,
            now: Timestamp,
            limit: usize,
        ) -> Result<Vec<LearningItem>, RecorderError> {
            self.inner.due_flashcards(user, now, limit)
        }

        fn due_questions(
            &self,
            user: &UserId,
            now: Timestamp,
            limit: usize,
        ) -> Result<Vec<LearningItem>, RecorderError> {
            self.inner.due_questions(user, now, limit)
        }

        fn new_flashcards(
            &self,
            user: &UserId,
            count: usize,
        ) -> Result<Vec<LearningItem>, RecorderError> {
            self.inner.new_flashcards(user, count)
        }

        fn review_events(
            &self,
            user: &UserId,
            since: Option<Timestamp>,
        ) -> Result<Vec<ReviewEvent>, RecorderError> {
            self.inner.review_events(user, since)
        }

        fn record_review(
            &self,
            user: &UserId,
            submission: ReviewSubmission,
        ) -> Result<ReviewEvent, RecorderError> {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(RecorderError::Conflict(submission.item_id));
            }
            self.inner.record_review(user, submission)
        }

        fn weak_questions(
            &self,
            user: &UserId,
            threshold: f64,
            limit: usize,
        ) -> Result<Vec<LearningItem>, RecorderError> {
            self.inner.weak_questions(user, threshold, limit)
        }

        fn start_session(
            &self,
            user: &UserId,
            focus: QueueFilter,
            target_minutes: Option<u32>,
            now: Timestamp,
        ) -> Result<SessionRecord, RecorderError> {
            self.inner.start_session(user, focus, target_minutes, now)
        }

        fn get_session(
            &self,
            user: &UserId,
            id: SessionId,
        ) -> Result<SessionRecord, RecorderError> {
            self.inner.get_session(user, id)
        }

        fn complete_session(
            &self,
            user: &UserId,
            id: SessionId,
            summary: SessionSummary,
            now: Timestamp,
        ) -> Result<SessionRecord, RecorderError> {
            self.inner.complete_session(user, id, summary, now)
        }

        fn sessions(
            &self,
            user: &UserId,
            limit: usize,
        ) -> Result<Vec<SessionRecord>, RecorderError> {
            self.inner.sessions(user, limit)
        }
    }

    fn contended(failures: usize) -> ReviewService<Contended> {
        let recorder = Contended {
            inner: MemoryRecorder::new(),
            failures: std::sync::Mutex::new(failures),
        };
        ReviewService::new(recorder, Config::default())
    }

    #[test]
    fn test_add_flashcard() -> Fallible<()> {
        let service = service();
        let item = service.add_flashcard(&user(), Flashcard::new("Q", "A"), now())?;
        assert!(item.is_new());
        assert_eq!(service.item(&user(), item.id)?, item);
        let again = service.add_flashcard(&user(), Flashcard::new("Q", "A"), now());
        assert!(again.is_err());
        Ok(())
    }

    #[test]
    fn test_add_blank_flashcard() {
        let service = service();
        let result = service.add_flashcard(&user(), Flashcard::new("  ", "A"), now());
        assert_eq!(
            result.unwrap_err().to_string(),
            "error: flashcard front must not be empty"
        );
    }

    #[test]
    fn test_add_missed_question_is_idempotent() -> Fallible<()> {
        let service = service();
        let first = service.add_missed_question(&user(), question("q-9"), now())?;
        service.submit_review(&user(), first.id, Rating::Again, 30, now())?;
        let second = service.add_missed_question(&user(), question("q-9"), now().plus_days(1))?;
        assert_eq!(first.id, second.id);
        assert_eq!(second.schedule.lapses(), 1);
        assert_eq!(service.recorder().items(&user())?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_end_to_end_reviews() -> Fallible<()> {
        let service = service();
        let user = user();
        let item = service.add_flashcard(&user, Flashcard::new("Q", "A"), now())?;
        let t1 = now();
        let e1 = service.submit_review(&user, item.id, Rating::Good, 10, t1)?;
        assert_eq!(e1.after.interval, 1);
        let t2 = t1.plus_days(1);
        let e2 = service.submit_review(&user, item.id, Rating::Good, 10, t2)?;
        assert_eq!(e2.after.interval, 6);
        let t3 = t2.plus_days(6);
        let e3 = service.submit_review(&user, item.id, Rating::Again, 10, t3)?;
        assert_eq!(e3.after.interval, 1);
        assert_eq!(e3.after.ease.value(), 2.3);

        let stored = service.item(&user, item.id)?;
        assert_eq!(stored.schedule.repetitions(), 0);
        assert_eq!(stored.schedule.lapses(), 1);
        assert_eq!(stored.tally.total, 3);
        assert_eq!(stored.tally.correct, 2);
        assert_eq!(service.recorder().review_events(&user, None)?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_review_unknown_item() {
        let service = service();
        let id = ItemContent::Flashcard(Flashcard::new("nope", "nope")).id();
        assert!(service
            .submit_review(&user(), id, Rating::Good, 5, now())
            .is_err());
    }

    #[test]
    fn test_conflict_is_retried() -> Fallible<()> {
        let service = contended(2);
        let item = service.add_flashcard(&user(), Flashcard::new("Q", "A"), now())?;
        service.submit_review(&user(), item.id, Rating::Good, 5, now())?;
        assert_eq!(service.recorder().inner.review_events(&user(), None)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_persistent_conflict_surfaces() -> Fallible<()> {
        let service = contended(MAX_ATTEMPTS);
        let item = service.add_flashcard(&user(), Flashcard::new("Q", "A"), now())?;
        let result = service.submit_review(&user(), item.id, Rating::Good, 5, now());
        assert!(result.is_err());
        assert!(service.recorder().inner.review_events(&user(), None)?.is_empty());
        assert!(service.item(&user(), item.id)?.is_new());
        Ok(())
    }

    #[test]
    fn test_answer_question() -> Fallible<()> {
        let service = service();
        let item = service.add_missed_question(&user(), question("q-1"), now())?;
        let event = service.answer_question(&user(), item.id, false, 40, now())?;
        assert_eq!(event.rating, Rating::Again);
        // The miss reset repetitions, so the next success is plain good.
        let later = now().plus_days(1);
        let event = service.answer_question(&user(), item.id, true, 20, later)?;
        assert_eq!(event.rating, Rating::Good);
        // One of two correct so far: weak mastery.
        let later = later.plus_days(1);
        let event = service.answer_question(&user(), item.id, true, 20, later)?;
        assert_eq!(event.rating, Rating::Hard);
        Ok(())
    }

    #[test]
    fn test_answer_rejects_flashcards() -> Fallible<()> {
        let service = service();
        let card = service.add_flashcard(&user(), Flashcard::new("Q", "A"), now())?;
        assert!(service.answer_question(&user(), card.id, true, 5, now()).is_err());
        Ok(())
    }

    #[test]
    fn test_queue_filters() -> Fallible<()> {
        let service = service();
        let u = user();
        for i in 0..3 {
            let card = service.add_flashcard(&u, Flashcard::new(format!("Q{i}"), "A"), now())?;
            service.submit_review(&u, card.id, Rating::Good, 5, now())?;
        }
        for i in 0..2 {
            service.add_missed_question(&u, question(&format!("q-{i}")), now())?;
        }
        let later = now().plus_days(2);
        let cards = service.queue(&u, QueueFilter::Flashcards, 10, later)?;
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|e| e.item_kind == ItemKind::Flashcard));
        let questions = service.queue(&u, QueueFilter::Questions, 10, later)?;
        assert_eq!(questions.len(), 2);
        let mixed = service.queue(&u, QueueFilter::Mixed, 4, later)?;
        let kinds: Vec<ItemKind> = mixed.iter().map(|e| e.item_kind).collect();
        assert_eq!(
            kinds,
            vec![
                ItemKind::Flashcard,
                ItemKind::Question,
                ItemKind::Flashcard,
                ItemKind::Question,
            ]
        );
        // Nothing is due before the first review interval passes.
        assert!(service.queue(&u, QueueFilter::Flashcards, 10, now())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_session() -> Fallible<()> {
        let service = service();
        let u = user();
        for i in 0..10 {
            let card = service.add_flashcard(&u, Flashcard::new(format!("due {i}"), "A"), now())?;
            service.submit_review(&u, card.id, Rating::Good, 5, now())?;
        }
        for i in 0..3 {
            service.add_flashcard(&u, Flashcard::new(format!("new {i}"), "A"), now())?;
        }
        let plan = service.session(&u, Some(8), now().plus_days(1))?;
        assert_eq!(plan.len(), 8);
        assert_eq!(plan.due_count, 6);
        assert_eq!(plan.new_count, 2);
        assert!(plan.items[..6].iter().all(|i| i.source == Source::Due));
        Ok(())
    }

    #[test]
    fn test_session_caps_unseen_backlog() -> Fallible<()> {
        let service = service();
        let u = user();
        for i in 0..20 {
            service.add_flashcard(&u, Flashcard::new(format!("unseen {i}"), "A"), now())?;
        }
        let t1 = now().plus_days(1);
        for i in 0..10 {
            let card = service.add_flashcard(&u, Flashcard::new(format!("seen {i}"), "A"), t1)?;
            service.submit_review(&u, card.id, Rating::Good, 5, t1)?;
        }
        let plan = service.session(&u, Some(8), t1.plus_days(1))?;
        assert_eq!(plan.len(), 8);
        assert_eq!(plan.due_count, 6);
        assert_eq!(plan.new_count, 2);
        for entry in &plan.items {
            let item = service.item(&u, entry.item_id)?;
            match entry.source {
                Source::Due => assert!(!item.is_new()),
                Source::New => assert!(item.is_new()),
            }
        }
        Ok(())
    }

    #[test]
    fn test_session_bootstrap() -> Fallible<()> {
        let service = service();
        let u = user();
        for i in 0..4 {
            service.add_flashcard(&u, Flashcard::new(format!("new {i}"), "A"), now())?;
        }
        let plan = service.session(&u, None, now())?;
        assert_eq!(plan.new_count, 4);
        assert_eq!(plan.due_count, 0);
        Ok(())
    }

    #[test]
    fn test_weak_questions() -> Fallible<()> {
        let service = service();
        let u = user();
        let shaky = service.add_missed_question(&u, question("q-1"), now())?;
        service.answer_question(&u, shaky.id, false, 30, now())?;
        let solid = service.add_missed_question(&u, question("q-2"), now())?;
        service.answer_question(&u, solid.id, true, 30, now())?;
        let weak = service.weak_questions(&u, 0.7, 20)?;
        let ids: Vec<ItemId> = weak.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![shaky.id]);
        assert!(service.weak_questions(&u, 1.5, 20).is_err());
        Ok(())
    }

    #[test]
    fn test_session_lifecycle() -> Fallible<()> {
        let service = service();
        let u = user();
        let card = service.add_flashcard(&u, Flashcard::new("Q", "A"), now())?;
        let q = service.add_missed_question(&u, question("q-1"), now())?;
        // Reviewed before the session started: not counted.
        service.submit_review(&u, card.id, Rating::Good, 5, now())?;

        let start = now().plus_days(1);
        let session = service.start_session(&u, QueueFilter::Mixed, Some(15), start)?;
        let t = Timestamp::parse("2025-09-11T12:05:00Z")?;
        service.submit_review(&u, card.id, Rating::Good, 5, t)?;
        service.answer_question(&u, q.id, false, 40, t)?;
        let end = Timestamp::parse("2025-09-11T12:20:00Z")?;
        let done = service.complete_session(&u, session.id, end)?;

        assert_eq!(done.completed_at, Some(end));
        assert_eq!(
            done.summary,
            SessionSummary {
                flashcards_reviewed: 1,
                questions_reviewed: 1,
                correct_count: 1,
                total_count: 2,
                duration_secs: 1200,
            }
        );
        assert!(service.complete_session(&u, session.id, end).is_err());
        assert_eq!(service.sessions(&u, 10)?, vec![done]);
        Ok(())
    }

    #[test]
    fn test_session_cannot_end_before_start() -> Fallible<()> {
        let service = service();
        let session = service.start_session(&user(), QueueFilter::Flashcards, None, now())?;
        let result = service.complete_session(&user(), session.id, now().minus_days(1));
        assert!(result.is_err());
        assert!(!service.sessions(&user(), 1)?[0].is_completed());
        Ok(())
    }

    #[test]
    fn test_stats() -> Fallible<()> {
        let service = service();
        let u = user();
        assert_eq!(service.stats(&u, now())?, Stats::default());
        let card = service.add_flashcard(&u, Flashcard::new("Q", "A"), now())?;
        service.add_flashcard(&u, Flashcard::new("Q2", "A"), now())?;
        service.submit_review(&u, card.id, Rating::Good, 5, now())?;
        let stats = service.stats(&u, now())?;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.new_count, 1);
        assert_eq!(stats.learning_count, 1);
        assert_eq!(stats.reviews_today, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.avg_retention_rate, 1.0);
        Ok(())
    }
}
