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

use crate::cmd::Context;
use crate::cmd::print_json;
use crate::error::Fallible;
use crate::types::card_kind::CardKind;
use crate::types::item::Flashcard;
use crate::types::item::LearningItem;
use crate::types::item::MissedQuestion;
use crate::types::timestamp::Timestamp;

/// Flashcard fields as given on the command line.
pub struct AddCard {
    pub front: String,
    pub back: String,
    pub hint: Option<String>,
    pub explanation: Option<String>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub module: Option<String>,
    pub kind: CardKind,
}

impl From<AddCard> for Flashcard {
    fn from(args: AddCard) -> Self {
        let mut card = Flashcard::new(args.front, args.back);
        card.hint = args.hint;
        card.explanation = args.explanation;
        card.image_url = args.image_url;
        card.tags = args.tags.into_iter().collect();
        card.module_id = args.module;
        card.kind = args.kind;
        card
    }
}

pub fn add_card(ctx: &Context, args: AddCard, now: Timestamp) -> Fallible<()> {
    let item = create_card(ctx, args, now)?;
    print_json(&item)
}

pub fn add_question(
    ctx: &Context,
    question_id: String,
    domain: Option<String>,
    now: Timestamp,
) -> Fallible<()> {
    let item = create_question(ctx, question_id, domain, now)?;
    print_json(&item)
}

fn create_card(ctx: &Context, args: AddCard, now: Timestamp) -> Fallible<LearningItem> {
    ctx.service.add_flashcard(&ctx.user, args.into(), now)
}

fn create_question(
    ctx: &Context,
    question_id: String,
    domain: Option<String>,
    now: Timestamp,
) -> Fallible<LearningItem> {
    let question = MissedQuestion {
        question_id: question_id.trim().to_string(),
        domain,
    };
    ctx.service.add_missed_question(&ctx.user, question, now)
}
