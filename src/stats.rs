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

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::StatsPolicy;
use crate::types::card_kind::ItemKind;
use crate::types::date::Date;
use crate::types::item::ItemContent;
use crate::types::item::LearningItem;
use crate::types::review::ReviewEvent;
use crate::types::timestamp::Timestamp;

/// Progress summary. Calendar days are UTC days.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub due_today: usize,
    pub flashcards_due: usize,
    pub questions_due: usize,
    pub new_count: usize,
    pub learning_count: usize,
    pub mature_count: usize,
    /// Fraction of recent reviews rated good or easy.
    pub avg_retention_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub reviews_today: usize,
    pub reviews_this_week: usize,
    pub avg_mastery: f64,
    pub mastered_questions: usize,
    /// Missed questions grouped by exam domain.
    pub questions_by_domain: BTreeMap<String, DomainStats>,
}

/// Domain label for questions recorded without one.
pub const UNKNOWN_DOMAIN: &str = "unknown";

#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStats {
    pub total: usize,
    /// Due by the end of today, as in `Stats::due_today`.
    pub due: usize,
    /// Mean mastery over every question in the domain, reviewed or not.
    pub avg_mastery: f64,
}

pub struct Aggregator {
    policy: StatsPolicy,
}

impl Aggregator {
    pub fn new(policy: StatsPolicy) -> Self {
        Self { policy }
    }

    pub fn summarize(
        &self,
        items: &[LearningItem],
        events: &[ReviewEvent],
        now: Timestamp,
    ) -> Stats {
        let today = now.date();
        let mut stats = Stats {
            total: items.len(),
            ..Stats::default()
        };

        let mut mastery_sum = 0.0;
        let mut reviewed = 0usize;
        for item in items {
            if item.schedule.due().date() <= today {
                stats.due_today += 1;
                match item.kind() {
                    ItemKind::Flashcard => stats.flashcards_due += 1,
                    ItemKind::Question => stats.questions_due += 1,
                }
            }
            let reps = item.schedule.repetitions();
            if item.is_new() {
                stats.new_count += 1;
            } else if reps >= self.policy.mature_repetitions {
                stats.mature_count += 1;
            } else if reps > 0 {
                stats.learning_count += 1;
            }
            if item.tally.total > 0 {
                mastery_sum += item.mastery();
                reviewed += 1;
            }
            if let ItemContent::Question(question) = &item.content {
                if reps >= self.policy.mastered_repetitions
                    && item.mastery() >= self.policy.mastered_mastery
                {
                    stats.mastered_questions += 1;
                }
                let domain = question.domain.as_deref().unwrap_or(UNKNOWN_DOMAIN);
                let entry = stats
                    .questions_by_domain
                    .entry(domain.to_string())
                    .or_default();
                entry.total += 1;
                if item.schedule.due().date() <= today {
                    entry.due += 1;
                }
                // Summed here, divided below.
                entry.avg_mastery += item.mastery();
            }
        }
        if reviewed > 0 {
            stats.avg_mastery = mastery_sum / reviewed as f64;
        }
        for domain in stats.questions_by_domain.values_mut() {
            domain.avg_mastery /= domain.total as f64;
        }

        let window_start = today.minus_days(self.policy.retention_window_days.saturating_sub(1));
        let week_start = today.minus_days(6);
        let mut in_window = 0usize;
        let mut retained = 0usize;
        for event in events {
            let day = event.reviewed_at.date();
            if day > today {
                continue;
            }
            if day == today {
                stats.reviews_today += 1;
            }
            if day >= week_start {
                stats.reviews_this_week += 1;
            }
            if day >= window_start {
                in_window += 1;
                if event.rating.is_correct() {
                    retained += 1;
                }
            }
        }
        if in_window > 0 {
            stats.avg_retention_rate = retained as f64 / in_window as f64;
        }

        let days: BTreeSet<Date> = events
            .iter()
            .map(|e| e.reviewed_at.date())
            .filter(|day| *day <= today)
            .collect();
        stats.current_streak = current_streak(&days, today);
        stats.longest_streak = longest_streak(&days);

        log::debug!(
            "Summarized {} items and {} events: {} due today, streak {}",
            items.len(),
            events.len(),
            stats.due_today,
            stats.current_streak
        );
        stats
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(StatsPolicy::default())
    }
}

/// Summarize with the default policy.
pub fn summarize(items: &[LearningItem], events: &[ReviewEvent], now: Timestamp) -> Stats {
    Aggregator::default().summarize(items, events, now)
}

/// Consecutive review days ending today, or ending yesterday if nothing has
/// been reviewed yet today.
fn current_streak(days: &BTreeSet<Date>, today: Date) -> u32 {
    let mut day = if days.contains(&today) {
        today
    } else {
        today.prev()
    };
    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        let prev = day.prev();
        if prev == day {
            break;
        }
        day = prev;
    }
    streak
}

fn longest_streak(days: &BTreeSet<Date>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut last: Option<Date> = None;
    for day in days {
        run = match last {
            Some(prev) if day.days_after(prev) == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        last = Some(*day);
    }
    longest
}
