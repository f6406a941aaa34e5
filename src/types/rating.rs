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

/// How well an item was recalled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    /// Whether the rating counts as a correct recall.
    pub fn is_correct(&self) -> bool {
        matches!(self, Rating::Good | Rating::Easy)
    }

    /// Derive a rating for an exam-question attempt, which is only ever
    /// marked right or wrong.
    pub fn from_answer(is_correct: bool, mastery: f64, repetitions: u32) -> Self {
        if !is_correct {
            return Rating::Again;
        }
        if repetitions == 0 {
            return Rating::Good;
        }
        if mastery >= 0.9 {
            Rating::Easy
        } else if mastery >= 0.7 {
            Rating::Good
        } else {
            Rating::Hard
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rating {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "1" => Ok(Rating::Again),
            "hard" | "2" => Ok(Rating::Hard),
            "good" | "3" => Ok(Rating::Good),
            "easy" | "4" => Ok(Rating::Easy),
            _ => fail(format!("invalid rating: {s}")),
        }
    }
}

impl TryFrom<String> for Rating {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl ToSql for Rating {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Rating {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Rating::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_parse() -> Fallible<()> {
        assert_eq!("again".parse::<Rating>()?, Rating::Again);
        assert_eq!("Hard".parse::<Rating>()?, Rating::Hard);
        assert_eq!(" good ".parse::<Rating>()?, Rating::Good);
        assert_eq!("4".parse::<Rating>()?, Rating::Easy);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "perfect".parse::<Rating>().unwrap_err();
        assert_eq!(err.to_string(), "error: invalid rating: perfect");
        assert!("5".parse::<Rating>().is_err());
        assert!("".parse::<Rating>().is_err());
    }

    #[test]
    fn test_round_trip_str() -> Fallible<()> {
        for rating in Rating::ALL {
            assert_eq!(rating.as_str().parse::<Rating>()?, rating);
        }
        Ok(())
    }

    #[test]
    fn test_is_correct() {
        assert!(!Rating::Again.is_correct());
        assert!(!Rating::Hard.is_correct());
        assert!(Rating::Good.is_correct());
        assert!(Rating::Easy.is_correct());
    }

    #[test]
    fn test_from_answer() {
        assert_eq!(Rating::from_answer(false, 1.0, 5), Rating::Again);
        assert_eq!(Rating::from_answer(true, 0.0, 0), Rating::Good);
        assert_eq!(Rating::from_answer(true, 0.95, 3), Rating::Easy);
        assert_eq!(Rating::from_answer(true, 0.75, 3), Rating::Good);
        assert_eq!(Rating::from_answer(true, 0.5, 3), Rating::Hard);
    }
}
