// Copyright 2025 Pitwall Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Temporal qualifiers and the ordering policy each one implies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Earliest year a question may refer to
pub const MIN_YEAR: u16 = 1950;

/// Latest year a question may refer to
pub const MAX_YEAR: u16 = 2030;

/// Row cap for before/after questions
pub const RELATIVE_RESULT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearError {
    #[error("Year {0} outside supported range {min}-{max}", min = MIN_YEAR, max = MAX_YEAR)]
    OutOfRange(i64),

    #[error("Not a year: {0:?}")]
    Invalid(String),
}

/// A calendar year within [`MIN_YEAR`, `MAX_YEAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Year(u16);

impl Year {
    pub fn new(year: i64) -> Result<Self, YearError> {
        if year < MIN_YEAR as i64 || year > MAX_YEAR as i64 {
            return Err(YearError::OutOfRange(year));
        }
        Ok(Self(year as u16))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for Year {
    type Error = YearError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Year> for i64 {
    fn from(year: Year) -> Self {
        year.0 as i64
    }
}

impl FromStr for Year {
    type Err = YearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(YearError::Invalid(s.to_string()));
        }
        let value: i64 = trimmed
            .parse()
            .map_err(|_| YearError::Invalid(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized reading of a year reference in a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "year", rename_all = "snake_case")]
pub enum TemporalQualifier {
    /// "in 2017"
    Absolute(Year),
    /// "before 2017"
    Before(Year),
    /// "after 2017"
    After(Year),
    /// No usable year reference
    None,
}

/// Sort direction on the fact's year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Ordering and cardinality applied to a query's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPolicy {
    /// `None` when the year filter is an equality and no ordering is needed
    pub order: Option<SortOrder>,
    /// `None` means natural cardinality
    pub limit: Option<usize>,
}

impl TemporalQualifier {
    /// Comparison operator and year for the year filter, if any.
    pub fn comparison(&self) -> Option<(&'static str, Year)> {
        match self {
            TemporalQualifier::Absolute(y) => Some(("=", *y)),
            TemporalQualifier::Before(y) => Some(("<", *y)),
            TemporalQualifier::After(y) => Some((">", *y)),
            TemporalQualifier::None => None,
        }
    }

    /// Ordering policy shared by every query template.
    ///
    /// Relative questions are multi-valued and return a short ranked list;
    /// absolute questions keep natural cardinality; without any temporal cue
    /// the most recent known fact wins.
    pub fn policy(&self) -> ResultPolicy {
        match self {
            TemporalQualifier::Absolute(_) => ResultPolicy {
                order: None,
                limit: None,
            },
            TemporalQualifier::Before(_) => ResultPolicy {
                order: Some(SortOrder::Descending),
                limit: Some(RELATIVE_RESULT_LIMIT),
            },
            TemporalQualifier::After(_) => ResultPolicy {
                order: Some(SortOrder::Ascending),
                limit: Some(RELATIVE_RESULT_LIMIT),
            },
            TemporalQualifier::None => ResultPolicy {
                order: Some(SortOrder::Descending),
                limit: Some(1),
            },
        }
    }
}

impl fmt::Display for TemporalQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalQualifier::Absolute(y) => write!(f, "in {}", y),
            TemporalQualifier::Before(y) => write!(f, "before {}", y),
            TemporalQualifier::After(y) => write!(f, "after {}", y),
            TemporalQualifier::None => write!(f, "latest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(y: i64) -> Year {
        Year::new(y).unwrap()
    }

    #[test]
    fn test_year_bounds() {
        assert!(Year::new(1950).is_ok());
        assert!(Year::new(2030).is_ok());
        assert_eq!(Year::new(1949), Err(YearError::OutOfRange(1949)));
        assert_eq!(Year::new(2031), Err(YearError::OutOfRange(2031)));
    }

    #[test]
    fn test_year_from_str() {
        assert_eq!("2017".parse::<Year>().unwrap().get(), 2017);
        assert!(" 2017 ".parse::<Year>().is_ok());
        assert!("17".parse::<Year>().is_err());
        assert!("20x7".parse::<Year>().is_err());
        assert_eq!("1900".parse::<Year>(), Err(YearError::OutOfRange(1900)));
    }

    #[test]
    fn test_policy_table() {
        let absolute = TemporalQualifier::Absolute(year(2017)).policy();
        assert_eq!(absolute.order, None);
        assert_eq!(absolute.limit, None);

        let before = TemporalQualifier::Before(year(2017)).policy();
        assert_eq!(before.order, Some(SortOrder::Descending));
        assert_eq!(before.limit, Some(5));

        let after = TemporalQualifier::After(year(2017)).policy();
        assert_eq!(after.order, Some(SortOrder::Ascending));
        assert_eq!(after.limit, Some(5));

        let latest = TemporalQualifier::None.policy();
        assert_eq!(latest.order, Some(SortOrder::Descending));
        assert_eq!(latest.limit, Some(1));
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            TemporalQualifier::Before(year(2020)).comparison(),
            Some(("<", year(2020)))
        );
        assert_eq!(
            TemporalQualifier::After(year(2015)).comparison(),
            Some((">", year(2015)))
        );
        assert_eq!(
            TemporalQualifier::Absolute(year(2017)).comparison(),
            Some(("=", year(2017)))
        );
        assert_eq!(TemporalQualifier::None.comparison(), None);
    }

    #[test]
    fn test_qualifier_serialization() {
        let json = serde_json::to_string(&TemporalQualifier::After(year(2018))).unwrap();
        assert_eq!(json, r#"{"type":"after","year":2018}"#);

        let restored: TemporalQualifier = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, TemporalQualifier::After(year(2018)));

        let bad: Result<TemporalQualifier, _> =
            serde_json::from_str(r#"{"type":"after","year":1800}"#);
        assert!(bad.is_err());
    }
}
