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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::timestamp::Timestamp;

/// The interval growth multiplier. Always finite and at least [`Ease::MIN`].
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Serialize)]
#[serde(transparent)]
pub struct Ease(f64);

impl Ease {
    /// The lowest ease any item can have.
    pub const MIN: f64 = 1.3;

    /// The ease of a never-reviewed item.
    pub const INITIAL: Ease = Ease(2.5);

    pub fn new(value: f64) -> Fallible<Self> {
        if !value.is_finite() {
            return fail(format!("ease must be a finite number, got {value}"));
        }
        if value < Self::MIN {
            return fail(format!("ease must be at least {}, got {value}", Self::MIN));
        }
        Ok(Self(value))
    }

    /// Build an ease from an arithmetic result: rounded to two decimals and
    /// raised to `floor` (itself never below [`Ease::MIN`]).
    pub(crate) fn saturating(value: f64, floor: f64) -> Self {
        let rounded = (value * 100.0).round() / 100.0;
        Self(rounded.max(floor).max(Self::MIN))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Display for Ease {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl ToSql for Ease {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Ease {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value: f64 = FromSql::column_result(value)?;
        Ease::new(value).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Scheduling state embedded in every learning item. Only the scheduler
/// produces new values; storage rebuilds them with [`ScheduleState::from_parts`].
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    ease: Ease,
    /// Days until the next review. Zero for a never-reviewed item.
    interval: u32,
    /// Consecutive non-lapse reviews since the last lapse.
    repetitions: u32,
    /// Number of `again` ratings ever recorded.
    lapses: u32,
    due: Timestamp,
    last_reviewed_at: Option<Timestamp>,
}

impl ScheduleState {
    /// The state of a freshly created item, due immediately.
    pub fn new(now: Timestamp) -> Self {
        Self {
            ease: Ease::INITIAL,
            interval: 0,
            repetitions: 0,
            lapses: 0,
            due: now,
            last_reviewed_at: None,
        }
    }

    /// Rebuild a state from stored values, checking the invariants that the
    /// type system does not.
    pub fn from_parts(
        ease: Ease,
        interval: u32,
        repetitions: u32,
        lapses: u32,
        due: Timestamp,
        last_reviewed_at: Option<Timestamp>,
    ) -> Fallible<Self> {
        if let Some(reviewed) = last_reviewed_at {
            if due < reviewed {
                return fail(format!(
                    "due date {due} precedes last review {reviewed}"
                ));
            }
        }
        Ok(Self {
            ease,
            interval,
            repetitions,
            lapses,
            due,
            last_reviewed_at,
        })
    }

    pub(crate) fn reviewed(
        ease: Ease,
        interval: u32,
        repetitions: u32,
        lapses: u32,
        now: Timestamp,
    ) -> Self {
        Self {
            ease,
            interval,
            repetitions,
            lapses,
            due: now.plus_days(interval),
            last_reviewed_at: Some(now),
        }
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    pub fn lapses(&self) -> u32 {
        self.lapses
    }

    pub fn due(&self) -> Timestamp {
        self.due
    }

    pub fn last_reviewed_at(&self) -> Option<Timestamp> {
        self.last_reviewed_at
    }

    /// Never reviewed.
    pub fn is_new(&self) -> bool {
        self.repetitions == 0 && self.last_reviewed_at.is_none()
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.due <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_bounds() {
        assert!(Ease::new(2.5).is_ok());
        assert!(Ease::new(1.3).is_ok());
        assert!(Ease::new(1.29).is_err());
        assert!(Ease::new(f64::NAN).is_err());
        assert!(Ease::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_ease_saturating() {
        assert_eq!(Ease::saturating(2.5 - 0.2, 1.3).value(), 2.3);
        assert_eq!(Ease::saturating(1.35 - 0.2, 1.3).value(), 1.3);
        assert_eq!(Ease::saturating(1.0, 0.5).value(), Ease::MIN);
        assert_eq!(Ease::saturating(2.0, 1.5).value(), 2.0);
    }

    #[test]
    fn test_new_state() -> Fallible<()> {
        let now = Timestamp::parse("2025-01-01T00:00:00Z")?;
        let state = ScheduleState::new(now);
        assert!(state.is_new());
        assert!(state.is_due(now));
        assert_eq!(state.interval(), 0);
        assert_eq!(state.ease(), Ease::INITIAL);
        Ok(())
    }

    #[test]
    fn test_from_parts_rejects_due_before_review() -> Fallible<()> {
        let reviewed = Timestamp::parse("2025-01-02T00:00:00Z")?;
        let due = Timestamp::parse("2025-01-01T00:00:00Z")?;
        let result = ScheduleState::from_parts(Ease::INITIAL, 1, 1, 0, due, Some(reviewed));
        assert!(result.is_err());
        Ok(())
    }
}
