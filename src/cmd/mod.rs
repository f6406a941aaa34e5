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

pub mod add;
pub mod check;
pub mod queue;
pub mod review;
pub mod sessions;
pub mod stats;

use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::error::Fallible;
use crate::recorder::SqliteRecorder;
use crate::service::ReviewService;
use crate::types::user::UserId;

/// What every command that touches the database needs.
pub struct Context {
    pub service: ReviewService<SqliteRecorder>,
    pub user: UserId,
}

impl Context {
    pub fn open(db: &Path, config: Option<&Path>, user: UserId) -> Fallible<Self> {
        let config = Config::load(config)?;
        let recorder = SqliteRecorder::open(db)?;
        Ok(Self {
            service: ReviewService::new(recorder, config),
            user,
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Fallible<()> {
    let json: String = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;
    use crate::types::timestamp::Timestamp;

    pub fn now() -> Timestamp {
        Timestamp::parse("2025-09-10T12:00:00Z").unwrap()
    }

    /// A context over a fresh database in a temporary directory.
    pub fn context() -> (TempDir, Context) {
        let dir = tempdir().unwrap();
        let user = UserId::new("tester").unwrap();
        let ctx = Context::open(&dir.path().join("test.db"), None, user).unwrap();
        (dir, ctx)
    }
}
