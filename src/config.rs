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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::schedule::Ease;

/// A hundred years. Upper bound for every day count in the file.
const MAX_DAYS: u32 = 36_500;

/// Tunable policy constants. Every section and every key is optional in the
/// TOML file; missing values take the defaults below.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scheduler: SchedulerPolicy,
    pub queue: QueuePolicy,
    pub session: SessionPolicy,
    pub stats: StatsPolicy,
}

/// Constants for the item scheduler.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerPolicy {
    /// Ease never drops below this.
    pub min_ease: f64,
    pub again_ease_penalty: f64,
    pub hard_ease_penalty: f64,
    pub easy_ease_bonus: f64,
    /// Interval after a lapse.
    pub again_interval: u32,
    pub hard_multiplier: f64,
    pub easy_multiplier: f64,
    /// Interval after the first successful review.
    pub first_interval: u32,
    /// Interval after the second consecutive successful review.
    pub second_interval: u32,
    /// Smallest interval for a never-reviewed item rated easy.
    pub easy_first_interval: u32,
    pub max_interval: u32,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            min_ease: Ease::MIN,
            again_ease_penalty: 0.20,
            hard_ease_penalty: 0.15,
            easy_ease_bonus: 0.15,
            again_interval: 1,
            hard_multiplier: 1.2,
            easy_multiplier: 1.3,
            first_interval: 1,
            second_interval: 6,
            easy_first_interval: 3,
            max_interval: MAX_DAYS,
        }
    }
}

/// Weights of the priority score.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueuePolicy {
    /// Each lapse amplifies overdue time by this fraction.
    pub lapse_weight: f64,
    /// Reference ease: items below it gain priority, items above lose it.
    pub base_ease: f64,
    pub ease_weight: f64,
    pub mastery_weight: f64,
    /// Importance of a missed question relative to a flashcard. Scales the
    /// overdue and mastery terms of a question's score.
    pub question_weight: f64,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            lapse_weight: 0.1,
            base_ease: Ease::INITIAL.value(),
            ease_weight: 2.0,
            mastery_weight: 1.0,
            question_weight: 1.0,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionPolicy {
    /// New items injected per due item.
    pub new_ratio: f64,
    /// Hard cap on new items per session, if any.
    pub max_new_per_session: Option<usize>,
    /// Session size when the caller does not give one.
    pub default_limit: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            new_ratio: 0.2,
            max_new_per_session: None,
            default_limit: 50,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsPolicy {
    /// Trailing window, in days, for the retention rate.
    pub retention_window_days: u32,
    /// Items with at least this many consecutive successes are mature.
    pub mature_repetitions: u32,
    /// A question is mastered once it has this many consecutive successes
    /// and at least `mastered_mastery` of its attempts were correct.
    pub mastered_repetitions: u32,
    pub mastered_mastery: f64,
}

impl Default for StatsPolicy {
    fn default() -> Self {
        Self {
            retention_window_days: 30,
            mature_repetitions: 3,
            mastered_repetitions: 2,
            mastered_mastery: 0.8,
        }
    }
}

impl Config {
    /// Load the configuration file at `path`, or the defaults if no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        match path {
            None => {
                log::debug!("Using default configuration.");
                Ok(Self::default())
            }
            Some(path) => {
                if !path.exists() {
                    return fail(format!(
                        "configuration file does not exist: {}",
                        path.display()
                    ));
                }
                log::debug!("Loading configuration from {}", path.display());
                let content = read_to_string(path)?;
                Self::from_toml(&content)
            }
        }
    }

    pub fn from_toml(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Fallible<()> {
        let s = &self.scheduler;
        if !s.min_ease.is_finite() || s.min_ease < Ease::MIN {
            return fail(format!("scheduler.min_ease must be at least {}", Ease::MIN));
        }
        for (name, value) in [
            ("scheduler.again_ease_penalty", s.again_ease_penalty),
            ("scheduler.hard_ease_penalty", s.hard_ease_penalty),
            ("scheduler.easy_ease_bonus", s.easy_ease_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return fail(format!("{name} must be a non-negative number"));
            }
        }
        for (name, value) in [
            ("scheduler.hard_multiplier", s.hard_multiplier),
            ("scheduler.easy_multiplier", s.easy_multiplier),
        ] {
            if !value.is_finite() || value < 1.0 {
                return fail(format!("{name} must be at least 1"));
            }
        }
        if s.again_interval == 0 || s.first_interval == 0 {
            return fail("scheduler intervals must be at least one day");
        }
        if s.second_interval < s.first_interval {
            return fail("scheduler.second_interval must not be shorter than first_interval");
        }
        if s.max_interval < s.second_interval.max(s.easy_first_interval) {
            return fail("scheduler.max_interval is shorter than the learning intervals");
        }
        if s.max_interval > MAX_DAYS {
            return fail(format!("scheduler.max_interval must be at most {MAX_DAYS}"));
        }
        let q = &self.queue;
        for (name, value) in [
            ("queue.lapse_weight", q.lapse_weight),
            ("queue.ease_weight", q.ease_weight),
            ("queue.mastery_weight", q.mastery_weight),
            ("queue.question_weight", q.question_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return fail(format!("{name} must be a non-negative number"));
            }
        }
        if !q.base_ease.is_finite() {
            return fail("queue.base_ease must be a finite number");
        }
        let r = self.session.new_ratio;
        if !(0.0..=1.0).contains(&r) {
            return fail("session.new_ratio must be between 0 and 1");
        }
        if self.stats.retention_window_days == 0 {
            return fail("stats.retention_window_days must be at least 1");
        }
        if self.stats.retention_window_days > MAX_DAYS {
            return fail(format!(
                "stats.retention_window_days must be at most {MAX_DAYS}"
            ));
        }
        if self.stats.mature_repetitions == 0 {
            return fail("stats.mature_repetitions must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.stats.mastered_mastery) {
            return fail("stats.mastered_mastery must be between 0 and 1");
        }
        Ok(())
    }
}
