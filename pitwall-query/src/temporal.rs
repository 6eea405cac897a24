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

//! Temporal expression resolution
//!
//! Turns a free-text context such as "before 2017" or "when he won in 2019"
//! into a [`TemporalQualifier`]. Only the first 4-digit token is ever looked
//! at; a token outside the supported range counts as no year at all.

use once_cell::sync::Lazy;
use pitwall_core::{TemporalQualifier, Year};
use regex::Regex;

/// A 4-digit token, optionally written as a decade ("2010s")
static YEAR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})s?\b").unwrap());

static RELATIVE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(before|after)\b").unwrap());

/// Relative keyword found in a context string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Before,
    After,
}

impl Relation {
    pub fn apply(self, year: Year) -> TemporalQualifier {
        match self {
            Relation::Before => TemporalQualifier::Before(year),
            Relation::After => TemporalQualifier::After(year),
        }
    }
}

/// First 4-digit token, if it is a supported year.
pub fn extract_year(context: &str) -> Option<Year> {
    YEAR_TOKEN
        .captures(context)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<Year>().ok())
}

pub fn detect_relation(context: &str) -> Option<Relation> {
    RELATIVE_KEYWORD
        .captures(context)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            if m.as_str().eq_ignore_ascii_case("before") {
                Relation::Before
            } else {
                Relation::After
            }
        })
}

/// Resolve a context string into a qualifier.
pub fn resolve(context: &str) -> TemporalQualifier {
    match (extract_year(context), detect_relation(context)) {
        (Some(year), Some(relation)) => relation.apply(year),
        (Some(year), None) => TemporalQualifier::Absolute(year),
        (None, _) => TemporalQualifier::None,
    }
}
