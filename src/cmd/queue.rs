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

use clap::ValueEnum;

use crate::cmd::Context;
use crate::cmd::print_json;
use crate::error::Fallible;
use crate::queue::QueueFilter;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
pub enum QueueKind {
    /// Flashcards only.
    Flashcard,
    /// Missed questions only.
    Question,
    /// Both, alternating.
    Mixed,
}

impl Display for QueueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueKind::Flashcard => write!(f, "flashcard"),
            QueueKind::Question => write!(f, "question"),
            QueueKind::Mixed => write!(f, "mixed"),
        }
    }
}

impl From<QueueKind> for QueueFilter {
    fn from(kind: QueueKind) -> Self {
        match kind {
            QueueKind::Flashcard => QueueFilter::Flashcards,
            QueueKind::Question => QueueFilter::Questions,
            QueueKind::Mixed => QueueFilter::Mixed,
        }
    }
}

pub fn print_queue(ctx: &Context, kind: QueueKind, limit: usize, now: Timestamp) -> Fallible<()> {
    log::debug!("Building {kind} queue of up to {limit} items.");
    let queue = ctx.service.queue(&ctx.user, kind.into(), limit, now)?;
    print_json(&queue)
}

pub fn print_session(ctx: &Context, limit: Option<usize>, now: Timestamp) -> Fallible<()> {
    let plan = ctx.service.session(&ctx.user, limit, now)?;
    if plan.is_empty() {
        log::info!("Nothing to review.");
    }
    print_json(&plan)
}

pub fn print_weak(ctx: &Context, threshold: f64, limit: usize) -> Fallible<()> {
    let weak = ctx.service.weak_questions(&ctx.user, threshold, limit)?;
    log::debug!("{} questions below mastery {threshold}.", weak.len());
    print_json(&weak)
}
