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

//! Fact graph schema: one node label, one edge type, free-text predicates.

use serde::{Deserialize, Serialize};

/// Node label for every named entity
pub const ENTITY_LABEL: &str = "Entity";

/// Edge type for every extracted fact; the predicate lives in `r.type`
pub const RELATION_TYPE: &str = "RELATION";

/// Vocabulary shown to the generative model so it can ground entity names
/// and predicate spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaHints {
    pub relationship_types: Vec<String>,
    pub sample_entities: Vec<String>,
}

impl SchemaHints {
    pub fn is_empty(&self) -> bool {
        self.relationship_types.is_empty() && self.sample_entities.is_empty()
    }

    /// Fill whichever side is empty from `other`.
    pub fn or(self, other: SchemaHints) -> SchemaHints {
        SchemaHints {
            relationship_types: if self.relationship_types.is_empty() {
                other.relationship_types
            } else {
                self.relationship_types
            },
            sample_entities: if self.sample_entities.is_empty() {
                other.sample_entities
            } else {
                self.sample_entities
            },
        }
    }
}

impl Default for SchemaHints {
    fn default() -> Self {
        Self {
            relationship_types: [
                "had_race_engineer",
                "is_race_engineer_for",
                "drove_for",
                "won_championship",
                "race_for_team",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            sample_entities: [
                "Lewis Hamilton",
                "Max Verstappen",
                "Peter Bonnington",
                "Mercedes-AMG Petronas F1 Team",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
