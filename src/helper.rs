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

//! Fixtures shared by the unit tests.

use crate::types::item::Flashcard;
use crate::types::item::ItemContent;
use crate::types::item::LearningItem;
use crate::types::item::MissedQuestion;
use crate::types::schedule::Ease;
use crate::types::schedule::ScheduleState;
use crate::types::timestamp::Timestamp;

/// A reviewed flashcard due at `due`, last reviewed one day earlier.
pub fn item_with(front: &str, ease: f64, lapses: u32, due: Timestamp) -> LearningItem {
    let content = ItemContent::Flashcard(Flashcard::new(front, "answer"));
    reviewed(content, ease, lapses, due)
}

/// A reviewed missed question due at `due`.
pub fn question_with(question_id: &str, ease: f64, due: Timestamp) -> LearningItem {
    let content = ItemContent::Question(MissedQuestion {
        question_id: question_id.to_string(),
        domain: None,
    });
    reviewed(content, ease, 0, due)
}

/// A never-reviewed flashcard created at `now`.
pub fn new_card(front: &str, now: Timestamp) -> LearningItem {
    LearningItem::new(ItemContent::Flashcard(Flashcard::new(front, "answer")), now)
}

fn reviewed(content: ItemContent, ease: f64, lapses: u32, due: Timestamp) -> LearningItem {
    let last = due.minus_days(1);
    let mut item = LearningItem::new(content, last);
    item.schedule = ScheduleState::from_parts(
        Ease::new(ease).expect("valid ease"),
        1,
        1,
        lapses,
        due,
        Some(last),
    )
    .expect("valid state");
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures() {
        let due = Timestamp::parse("2025-01-10T00:00:00Z").unwrap();
        let item = item_with("front", 2.0, 2, due);
        assert!(!item.is_new());
        assert_eq!(item.schedule.lapses(), 2);
        assert!(new_card("front", due).is_new());
        assert_ne!(item.id, question_with("front", 2.5, due).id);
    }
}
