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

//! Question shape recognition
//!
//! An ordered table of case-insensitive patterns. Scanning stops at the
//! first pattern that matches; its captures are parsed into a typed
//! [`Intent`]. When that parse fails the question is treated as unmatched
//! and later rules are not tried.
//!
//! ## Recognized questions
//!
//! - "Who was Lewis Hamilton's race engineer in 2017?"
//! - "Who was Peter Bonnington race engineer for before 2024?"
//! - "What team did Max Verstappen drive for in 2020?"
//! - "Who won the championship in 2017?"
//! - "Which team dominated the 2020 season?"
//! - "What team did Max Verstappen drive for after 2018?"
//! - "Who won the world championship before 2020?"
//! - "Which team dominated the season after 2015?"

use crate::temporal;
use once_cell::sync::Lazy;
use pitwall_core::{TemporalQualifier, Year, YearError};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rules in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    EngineerForDriver,
    DriversForEngineer,
    TeamInYear,
    ChampionInYear,
    DominantTeamInYear,
    TeamRelative,
    ChampionRelative,
    DominantTeamRelative,
}

impl RuleKind {
    pub const ALL: [RuleKind; 8] = [
        RuleKind::EngineerForDriver,
        RuleKind::DriversForEngineer,
        RuleKind::TeamInYear,
        RuleKind::ChampionInYear,
        RuleKind::DominantTeamInYear,
        RuleKind::TeamRelative,
        RuleKind::ChampionRelative,
        RuleKind::DominantTeamRelative,
    ];

    fn pattern(self) -> &'static str {
        match self {
            RuleKind::EngineerForDriver => {
                r"(?i)who was (.+?)['’]s? race engineer ((?:when|in|for|during|before|after)\b.+?)(?:\?|$)"
            }
            RuleKind::DriversForEngineer => {
                r"(?i)who was (.+?) race engineer for (before|after|during) (\d{4})(?:\?|$)"
            }
            RuleKind::TeamInYear => {
                r"(?i)what team did (.+?) (?:drive for|race for) (?:in|during) (\d{4})(?:\?|$)"
            }
            RuleKind::ChampionInYear => {
                r"(?i)who won (?:the )?(?:world )?championship (?:in|during) (\d{4})(?:\?|$)"
            }
            RuleKind::DominantTeamInYear => {
                r"(?i)which team dominated (?:the )?(\d{4}) season(?:\?|$)"
            }
            RuleKind::TeamRelative => {
                r"(?i)what team did (.+?) (?:drive for|race for) (before|after) (\d{4})(?:\?|$)"
            }
            RuleKind::ChampionRelative => {
                r"(?i)who won (?:the )?(?:world )?championship (before|after) (\d{4})(?:\?|$)"
            }
            RuleKind::DominantTeamRelative => {
                r"(?i)which team dominated (?:the )?season (before|after) (\d{4})(?:\?|$)"
            }
        }
    }

    /// Position in the priority order, starting at 1
    pub fn priority(self) -> usize {
        RuleKind::ALL
            .iter()
            .position(|kind| *kind == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Turn this rule's captures into an intent.
    pub fn parse(self, caps: &Captures<'_>) -> Result<Intent, HandlerError> {
        match self {
            RuleKind::EngineerForDriver => Ok(Intent::RoleHolderForSubject {
                subject: entity(caps, 1)?,
                when: temporal::resolve(capture(caps, 2)?),
            }),
            RuleKind::DriversForEngineer => {
                let holder = entity(caps, 1)?;
                let year = literal_year(caps, 3)?;
                let when = match capture(caps, 2)?.to_lowercase().as_str() {
                    "before" => TemporalQualifier::Before(year),
                    "after" => TemporalQualifier::After(year),
                    _ => TemporalQualifier::Absolute(year),
                };
                Ok(Intent::SubjectsForRoleHolder { holder, when })
            }
            RuleKind::TeamInYear => Ok(Intent::TeamForDriver {
                driver: entity(caps, 1)?,
                when: TemporalQualifier::Absolute(literal_year(caps, 2)?),
            }),
            RuleKind::ChampionInYear => Ok(Intent::Champion {
                when: TemporalQualifier::Absolute(literal_year(caps, 1)?),
            }),
            RuleKind::DominantTeamInYear => Ok(Intent::DominantTeam {
                when: TemporalQualifier::Absolute(literal_year(caps, 1)?),
            }),
            RuleKind::TeamRelative => Ok(Intent::TeamForDriver {
                driver: entity(caps, 1)?,
                when: relative_year(caps, 2, 3)?,
            }),
            RuleKind::ChampionRelative => Ok(Intent::Champion {
                when: relative_year(caps, 1, 2)?,
            }),
            RuleKind::DominantTeamRelative => Ok(Intent::DominantTeam {
                when: relative_year(caps, 1, 2)?,
            }),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::EngineerForDriver => "engineer_for_driver",
            RuleKind::DriversForEngineer => "drivers_for_engineer",
            RuleKind::TeamInYear => "team_in_year",
            RuleKind::ChampionInYear => "champion_in_year",
            RuleKind::DominantTeamInYear => "dominant_team_in_year",
            RuleKind::TeamRelative => "team_relative",
            RuleKind::ChampionRelative => "champion_relative",
            RuleKind::DominantTeamRelative => "dominant_team_relative",
        };
        f.write_str(name)
    }
}

/// What a recognized question asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Race engineer(s) of a driver
    RoleHolderForSubject {
        subject: String,
        when: TemporalQualifier,
    },
    /// Drivers an engineer worked with
    SubjectsForRoleHolder {
        holder: String,
        when: TemporalQualifier,
    },
    TeamForDriver {
        driver: String,
        when: TemporalQualifier,
    },
    Champion {
        when: TemporalQualifier,
    },
    DominantTeam {
        when: TemporalQualifier,
    },
}

impl Intent {
    pub fn when(&self) -> TemporalQualifier {
        match self {
            Intent::RoleHolderForSubject { when, .. }
            | Intent::SubjectsForRoleHolder { when, .. }
            | Intent::TeamForDriver { when, .. }
            | Intent::Champion { when }
            | Intent::DominantTeam { when } => *when,
        }
    }
}

/// A firing rule whose captures could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("capture group {0} missing")]
    MissingCapture(usize),

    #[error("empty entity name")]
    EmptyEntity,

    #[error(transparent)]
    Year(#[from] YearError),
}

fn capture<'t>(caps: &Captures<'t>, index: usize) -> Result<&'t str, HandlerError> {
    caps.get(index)
        .map(|m| m.as_str())
        .ok_or(HandlerError::MissingCapture(index))
}

fn entity(caps: &Captures<'_>, index: usize) -> Result<String, HandlerError> {
    let name = capture(caps, index)?.trim();
    if name.is_empty() {
        return Err(HandlerError::EmptyEntity);
    }
    Ok(name.to_string())
}

fn literal_year(caps: &Captures<'_>, index: usize) -> Result<Year, HandlerError> {
    Ok(capture(caps, index)?.parse::<Year>()?)
}

/// A literal "before|after YYYY" pair; the year must be in range.
fn relative_year(
    caps: &Captures<'_>,
    keyword: usize,
    year: usize,
) -> Result<TemporalQualifier, HandlerError> {
    let relation = temporal::detect_relation(capture(caps, keyword)?)
        .ok_or(HandlerError::MissingCapture(keyword))?;
    Ok(relation.apply(literal_year(caps, year)?))
}

struct Rule {
    kind: RuleKind,
    pattern: Regex,
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    RuleKind::ALL
        .iter()
        .map(|&kind| Rule {
            kind,
            pattern: Regex::new(kind.pattern()).unwrap(),
        })
        .collect()
});

/// Result of scanning the rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    Matched { rule: RuleKind, intent: Intent },
    /// The first firing rule rejected its captures
    Rejected { rule: RuleKind, error: HandlerError },
    NoMatch,
}

impl RuleMatch {
    pub fn intent(&self) -> Option<&Intent> {
        match self {
            RuleMatch::Matched { intent, .. } => Some(intent),
            _ => None,
        }
    }
}

/// The fixed, ordered rule table.
#[derive(Clone, Copy)]
pub struct PatternRegistry {
    rules: &'static [Rule],
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self { rules: &RULES }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = RuleKind> + '_ {
        self.rules.iter().map(|rule| rule.kind)
    }

    /// Scan rules in priority order; the first firing rule decides.
    pub fn match_question(&self, question: &str) -> RuleMatch {
        let question = question.trim();

        for rule in self.rules {
            if let Some(caps) = rule.pattern.captures(question) {
                return match rule.kind.parse(&caps) {
                    Ok(intent) => RuleMatch::Matched {
                        rule: rule.kind,
                        intent,
                    },
                    Err(error) => RuleMatch::Rejected {
                        rule: rule.kind,
                        error,
                    },
                };
            }
        }

        RuleMatch::NoMatch
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
