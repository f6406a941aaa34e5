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

use clap::ValueEnum;

use crate::cmd::Context;
use crate::cmd::print_json;
use crate::error::Fallible;
use crate::types::item_id::ItemId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
pub enum Outcome {
    /// The question was answered right.
    Correct,
    /// The question was answered wrong.
    Wrong,
}

pub fn review(
    ctx: &Context,
    item: ItemId,
    rating: Rating,
    time_spent_secs: u32,
    now: Timestamp,
) -> Fallible<()> {
    let event = ctx
        .service
        .submit_review(&ctx.user, item, rating, time_spent_secs, now)?;
    print_json(&event)
}

pub fn answer(
    ctx: &Context,
    item: ItemId,
    outcome: Outcome,
    time_spent_secs: u32,
    now: Timestamp,
) -> Fallible<()> {
    let is_correct = outcome == Outcome::Correct;
    let event = ctx
        .service
        .answer_question(&ctx.user, item, is_correct, time_spent_secs, now)?;
    print_json(&event)
}
