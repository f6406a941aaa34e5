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

//! The item scheduler: an SM-2 style state machine over [`ScheduleState`],
//! driven by a four-level [`Rating`].

use crate::config::SchedulerPolicy;
use crate::types::rating::Rating;
use crate::types::schedule::Ease;
use crate::types::schedule::ScheduleState;
use crate::types::timestamp::Timestamp;

pub struct Scheduler {
    policy: SchedulerPolicy,
}

impl Scheduler {
    pub fn new(policy: SchedulerPolicy) -> Self {
        Self { policy }
    }

    /// Apply `rating` to `state` at instant `now`. Total: every rating is
    /// valid for every state.
    pub fn schedule(&self, state: &ScheduleState, rating: Rating, now: Timestamp) -> ScheduleState {
        let p = &self.policy;
        let ease = state.ease().value();
        let interval = state.interval();
        let (ease, interval, repetitions, lapses) = match rating {
            Rating::Again => (
                Ease::saturating(ease - p.again_ease_penalty, p.min_ease),
                p.again_interval,
                0,
                state.lapses() + 1,
            ),
            Rating::Hard => {
                let next = round_days(f64::from(interval) * p.hard_multiplier).max(1);
                (
                    Ease::saturating(ease - p.hard_ease_penalty, p.min_ease),
                    next,
                    state.repetitions() + 1,
                    state.lapses(),
                )
            }
            Rating::Good => {
                let repetitions = state.repetitions() + 1;
                let next = match repetitions {
                    1 => p.first_interval,
                    2 => p.second_interval,
                    _ => round_days(f64::from(interval) * ease).max(1),
                };
                (state.ease(), next, repetitions, state.lapses())
            }
            Rating::Easy => {
                let new_ease = Ease::saturating(ease + p.easy_ease_bonus, p.min_ease);
                let base = f64::from(interval.max(1));
                let mut next = round_days(base * new_ease.value() * p.easy_multiplier);
                if interval == 0 {
                    next = next.max(p.easy_first_interval);
                }
                (new_ease, next, state.repetitions() + 1, state.lapses())
            }
        };
        let interval = interval.clamp(1, p.max_interval.max(1));
        let next = ScheduleState::reviewed(ease, interval, repetitions, lapses, now);
        log::debug!(
            "{} ease={} interval={}d reps={} lapses={} due={}",
            rating,
            next.ease(),
            next.interval(),
            next.repetitions(),
            next.lapses(),
            next.due()
        );
        next
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerPolicy::default())
    }
}

/// Schedule with the default policy.
pub fn schedule(state: &ScheduleState, rating: Rating, now: Timestamp) -> ScheduleState {
    Scheduler::default().schedule(state, rating, now)
}

fn round_days(days: f64) -> u32 {
    if days.is_finite() && days > 0.0 {
        days.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
