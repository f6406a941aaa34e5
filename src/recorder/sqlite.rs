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

use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Params;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::config::DbConfig;

use crate::error::Fallible;
use crate::queue::QueueFilter;
use crate::recorder::RecorderError;
use crate::recorder::RecorderResult;
use crate::recorder::ReviewRecorder;
use crate::recorder::apply_review;
use crate::types::card_kind::ItemKind;
use crate::types::item::ItemContent;
use crate::types::item::LearningItem;
use crate::types::item::Tally;
use crate::types::item_id::ItemId;
use crate::types::rating::Rating;
use crate::types::review::ReviewEvent;
use crate::types::review::ReviewSubmission;
use crate::types::review::Snapshot;
use crate::types::schedule::Ease;
use crate::types::schedule::ScheduleState;
use crate::types::session_record::SessionId;
use crate::types::session_record::SessionRecord;
use crate::types::session_record::SessionSummary;
use crate::types::timestamp::Timestamp;
use crate::types::user::UserId;

const ITEM_COLUMNS: &str = "item_id, content, ease, interval_days, repetitions, lapses, due_at, last_reviewed_at, review_count, correct_count, avg_time_secs, created_at";

const EVENT_COLUMNS: &str = "item_id, item_kind, rating, time_spent_secs, ease_before, interval_before, ease_after, interval_after, reviewed_at";

const SESSION_COLUMNS: &str = "session_id, focus, target_minutes, started_at, completed_at, flashcards_reviewed, questions_reviewed, correct_count, total_count, duration_secs";

/// Fraction of correct reviews, zero for a never-reviewed item.
const MASTERY: &str =
    "(case when review_count = 0 then 0.0 else cast(correct_count as real) / review_count end)";

/// A recorder backed by a SQLite database file.
pub struct SqliteRecorder {
    conn: Mutex<Connection>,
}

impl SqliteRecorder {
    /// Open the database at `path`, creating the schema if it is missing.
    pub fn open(path: impl AsRef<Path>) -> Fallible<Self> {
        let path = path.as_ref();
        log::debug!("Opening database at {}", path.display());
        let mut conn = Connection::open(path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        {
            let tx = conn.transaction()?;
            if !sessions_table_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn acquire(&self) -> RecorderResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RecorderError::Storage("database lock poisoned".to_string()))
    }

    fn due_of_kind(
        &self,
        user: &UserId,
        kind: ItemKind,
        now: Timestamp,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {ITEM_COLUMNS} from items where user_id = ? and item_kind = ? and due_at <= ? order by due_at, item_id limit ?;"
        );
        query_items(&conn, &sql, (user, kind, now, sql_limit(limit)))
    }
}

impl ReviewRecorder for SqliteRecorder {
    fn insert_item(&self, user: &UserId, item: &LearningItem) -> RecorderResult<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if item_exists(&tx, user, item.id)? {
            return Err(RecorderError::Duplicate(item.id));
        }
        log::debug!("Inserting item {} for {user}", item.id.short());
        let sql = "insert into items (user_id, item_id, item_kind, content, ease, interval_days, repetitions, lapses, due_at, last_reviewed_at, review_count, correct_count, avg_time_secs, created_at) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);";
        let content = serde_json::to_string(&item.content)?;
        let s = &item.schedule;
        tx.execute(
            sql,
            rusqlite::params![
                user,
                item.id,
                item.kind(),
                content,
                s.ease(),
                s.interval(),
                s.repetitions(),
                s.lapses(),
                s.due(),
                s.last_reviewed_at(),
                item.tally.total,
                item.tally.correct,
                item.tally.avg_time_secs,
                item.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_item(&self, user: &UserId, id: ItemId) -> RecorderResult<LearningItem> {
        let conn = self.acquire()?;
        select_item(&conn, user, id)
    }

    fn items(&self, user: &UserId) -> RecorderResult<Vec<LearningItem>> {
        let conn = self.acquire()?;
        let sql = format!("select {ITEM_COLUMNS} from items where user_id = ? order by item_id;");
        query_items(&conn, &sql, [user])
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
        let conn = self.acquire()?;
        let sql = format!(
            "select {ITEM_COLUMNS} from items where user_id = ? and item_kind = ? and repetitions = 0 and last_reviewed_at is null order by created_at desc, item_id limit ?;"
        );
        query_items(&conn, &sql, (user, ItemKind::Flashcard, sql_limit(count)))
    }

    fn weak_questions(
        &self,
        user: &UserId,
        threshold: f64,
        limit: usize,
    ) -> RecorderResult<Vec<LearningItem>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {ITEM_COLUMNS} from items where user_id = ? and item_kind = ? and {MASTERY} < ? order by {MASTERY}, item_id limit ?;"
        );
        query_items(
            &conn,
            &sql,
            (user, ItemKind::Question, threshold, sql_limit(limit)),
        )
    }

    fn review_events(
        &self,
        user: &UserId,
        since: Option<Timestamp>,
    ) -> RecorderResult<Vec<ReviewEvent>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {EVENT_COLUMNS} from review_events where user_id = ?1 and (?2 is null or reviewed_at >= ?2) order by reviewed_at, event_id;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query((user, since))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(read_event(row)?);
        }
        Ok(events)
    }

    fn record_review(
        &self,
        user: &UserId,
        submission: ReviewSubmission,
    ) -> RecorderResult<ReviewEvent> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut item = select_item(&tx, user, submission.item_id)?;
        let event = apply_review(&mut item, submission)?;
        update_item(&tx, user, &item)?;
        insert_event(&tx, user, &event)?;
        tx.commit()?;
        Ok(event)
    }

    fn start_session(
        &self,
        user: &UserId,
        focus: QueueFilter,
        target_minutes: Option<u32>,
        now: Timestamp,
    ) -> RecorderResult<SessionRecord> {
        let conn = self.acquire()?;
        let sql = "insert into review_sessions (user_id, focus, target_minutes, started_at) values (?, ?, ?, ?);";
        conn.execute(sql, (user, focus, target_minutes, now))?;
        let id = SessionId::new(conn.last_insert_rowid());
        log::debug!("Started session {id} for {user}");
        Ok(SessionRecord {
            id,
            focus,
            target_minutes,
            started_at: now,
            completed_at: None,
            summary: SessionSummary::default(),
        })
    }

    fn get_session(&self, user: &UserId, id: SessionId) -> RecorderResult<SessionRecord> {
        let conn = self.acquire()?;
        select_session(&conn, user, id)
    }

    fn complete_session(
        &self,
        user: &UserId,
        id: SessionId,
        summary: SessionSummary,
        now: Timestamp,
    ) -> RecorderResult<SessionRecord> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let record = select_session(&tx, user, id)?;
        if record.is_completed() {
            return Err(RecorderError::SessionClosed(id));
        }
        let sql = "update review_sessions set completed_at = ?, flashcards_reviewed = ?, questions_reviewed = ?, correct_count = ?, total_count = ?, duration_secs = ? where user_id = ? and session_id = ?;";
        tx.execute(
            sql,
            rusqlite::params![
                now,
                summary.flashcards_reviewed,
                summary.questions_reviewed,
                summary.correct_count,
                summary.total_count,
                summary.duration_secs,
                user,
                id,
            ],
        )?;
        tx.commit()?;
        Ok(SessionRecord {
            completed_at: Some(now),
            summary,
            ..record
        })
    }

    fn sessions(&self, user: &UserId, limit: usize) -> RecorderResult<Vec<SessionRecord>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {SESSION_COLUMNS} from review_sessions where user_id = ? order by started_at desc, session_id desc limit ?;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query((user, sql_limit(limit)))?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(read_session(row)?);
        }
        Ok(sessions)
    }
}

struct ItemRow {
    item_id: ItemId,
    content: String,
    ease: Ease,
    interval: u32,
    repetitions: u32,
    lapses: u32,
    due: Timestamp,
    last_reviewed_at: Option<Timestamp>,
    total: u32,
    correct: u32,
    avg_time_secs: f64,
    created_at: Timestamp,
}

impl ItemRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            item_id: row.get(0)?,
            content: row.get(1)?,
            ease: row.get(2)?,
            interval: row.get(3)?,
            repetitions: row.get(4)?,
            lapses: row.get(5)?,
            due: row.get(6)?,
            last_reviewed_at: row.get(7)?,
            total: row.get(8)?,
            correct: row.get(9)?,
            avg_time_secs: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn into_item(self) -> RecorderResult<LearningItem> {
        let content: ItemContent = serde_json::from_str(&self.content)?;
        let schedule = ScheduleState::from_parts(
            self.ease,
            self.interval,
            self.repetitions,
            self.lapses,
            self.due,
            self.last_reviewed_at,
        )?;
        Ok(LearningItem {
            id: self.item_id,
            content,
            schedule,
            tally: Tally {
                total: self.total,
                correct: self.correct,
                avg_time_secs: self.avg_time_secs,
            },
            created_at: self.created_at,
        })
    }
}

/// SQLite treats a negative limit as no limit.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(-1)
}

fn query_items<P: Params>(conn: &Connection, sql: &str, params: P) -> RecorderResult<Vec<LearningItem>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(ItemRow::read(row)?.into_item()?);
    }
    Ok(items)
}

fn select_item(conn: &Connection, user: &UserId, id: ItemId) -> RecorderResult<LearningItem> {
    let sql = format!("select {ITEM_COLUMNS} from items where user_id = ? and item_id = ?;");
    match conn.query_row(&sql, (user, id), ItemRow::read).optional()? {
        Some(row) => row.into_item(),
        None => Err(RecorderError::NotFound(id)),
    }
}

fn item_exists(conn: &Connection, user: &UserId, id: ItemId) -> RecorderResult<bool> {
    let sql = "select count(*) from items where user_id = ? and item_id = ?;";
    let count: i64 = conn.query_row(sql, (user, id), |row| row.get(0))?;
    Ok(count > 0)
}

fn update_item(tx: &Transaction, user: &UserId, item: &LearningItem) -> RecorderResult<()> {
    let sql = "update items set ease = ?, interval_days = ?, repetitions = ?, lapses = ?, due_at = ?, last_reviewed_at = ?, review_count = ?, correct_count = ?, avg_time_secs = ? where user_id = ? and item_id = ?;";
    let s = &item.schedule;
    tx.execute(
        sql,
        rusqlite::params![
            s.ease(),
            s.interval(),
            s.repetitions(),
            s.lapses(),
            s.due(),
            s.last_reviewed_at(),
            item.tally.total,
            item.tally.correct,
            item.tally.avg_time_secs,
            user,
            item.id,
        ],
    )?;
    Ok(())
}

fn insert_event(tx: &Transaction, user: &UserId, event: &ReviewEvent) -> RecorderResult<()> {
    let sql = format!("insert into review_events (user_id, {EVENT_COLUMNS}) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?);");
    tx.execute(
        &sql,
        rusqlite::params![
            user,
            event.item_id,
            event.item_kind,
            event.rating,
            event.time_spent_secs,
            event.before.ease,
            event.before.interval,
            event.after.ease,
            event.after.interval,
            event.reviewed_at,
        ],
    )?;
    Ok(())
}

fn read_event(row: &Row<'_>) -> rusqlite::Result<ReviewEvent> {
    let rating: Rating = row.get(2)?;
    Ok(ReviewEvent {
        item_id: row.get(0)?,
        item_kind: row.get(1)?,
        rating,
        time_spent_secs: row.get(3)?,
        before: Snapshot {
            ease: row.get(4)?,
            interval: row.get(5)?,
        },
        after: Snapshot {
            ease: row.get(6)?,
            interval: row.get(7)?,
        },
        reviewed_at: row.get(8)?,
    })
}

fn select_session(conn: &Connection, user: &UserId, id: SessionId) -> RecorderResult<SessionRecord> {
    let sql = format!(
        "select {SESSION_COLUMNS} from review_sessions where user_id = ? and session_id = ?;"
    );
    conn.query_row(&sql, (user, id), read_session)
        .optional()?
        .ok_or(RecorderError::SessionNotFound(id))
}

fn read_session(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        focus: row.get(1)?,
        target_minutes: row.get(2)?,
        started_at: row.get(3)?,
        completed_at: row.get(4)?,
        summary: SessionSummary {
            flashcards_reviewed: row.get(5)?,
            questions_reviewed: row.get(6)?,
            correct_count: row.get(7)?,
            total_count: row.get(8)?,
            duration_secs: row.get(9)?,
        },
    })
}

/// Looks for the newest table, so that databases created before it existed
/// get it added. Every statement in the schema is idempotent.
fn sessions_table_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["review_sessions"], |row| row.get(0))?;
    Ok(count > 0)
}
