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
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::card_kind::ItemKind;
use crate::types::item::Flashcard;

const CARD_PREFIX: &str = "card";
const QUESTION_PREFIX: &str = "question";

/// Identifies a learning item by its kind and a digest of the fields that
/// make it that item. The text form is `card-<hex>` or `question-<hex>`.
///
/// Ids order by kind first, so flashcards sort before questions in SQL as
/// well as in memory.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ItemId {
    kind: ItemKind,
    digest: [u8; 32],
}

impl ItemId {
    /// The id of a flashcard. Only the card kind, front, and back count:
    /// editing a hint or tags keeps the card's history.
    pub fn flashcard(card: &Flashcard) -> Self {
        Self::digest(
            ItemKind::Flashcard,
            &[card.kind.as_str(), &card.front, &card.back],
        )
    }

    /// The id of a missed question, from its question bank reference.
    pub fn question(question_id: &str) -> Self {
        Self::digest(ItemKind::Question, &[question_id])
    }

    fn digest(kind: ItemKind, fields: &[&str]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(kind.as_str().as_bytes());
        for field in fields {
            // Length prefix, so "ab" + "c" and "a" + "bc" differ.
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        Self {
            kind,
            digest: *hasher.finalize().as_bytes(),
        }
    }

    pub fn kind(self) -> ItemKind {
        self.kind
    }

    fn hex(self) -> String {
        blake3::Hash::from_bytes(self.digest).to_hex().to_string()
    }

    /// Prefix and the first eight hex digits, for log lines.
    pub fn short(self) -> String {
        format!("{}-{}", prefix(self.kind), &self.hex()[..8])
    }
}

fn prefix(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Flashcard => CARD_PREFIX,
        ItemKind::Question => QUESTION_PREFIX,
    }
}

impl FromStr for ItemId {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((head, hex)) = s.split_once('-') else {
            return fail(format!("invalid item id: {s}"));
        };
        let kind = match head {
            CARD_PREFIX => ItemKind::Flashcard,
            QUESTION_PREFIX => ItemKind::Question,
            _ => return fail(format!("invalid item id: {s}")),
        };
        let digest = blake3::Hash::from_hex(hex)
            .map_err(|_| ErrorReport::new(format!("invalid item id: {s}")))?;
        Ok(Self {
            kind,
            digest: *digest.as_bytes(),
        })
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}-{}", prefix(self.kind), self.hex())
    }
}

impl ToSql for ItemId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for ItemId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        string
            .parse()
            .map_err(|e: ErrorReport| FromSqlError::Other(Box::new(e)))
    }
}

impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
