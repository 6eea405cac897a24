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

use crate::query::{GraphQuery, ParamValue};
use crate::row::Row;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Returned when no query could be produced for a question
pub const NO_QUERY_ANSWER: &str = "Sorry, I couldn't understand that question.";

/// Returned when a query ran but produced no rows
pub const NO_RESULTS_ANSWER: &str =
    "I couldn't find an answer to that question in the knowledge graph.";

/// Strategy that produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Approach {
    RuleBased,
    LlmBased,
    None,
    Error,
}

impl Approach {
    pub fn as_str(&self) -> &'static str {
        match self {
            Approach::RuleBased => "rule-based",
            Approach::LlmBased => "llm-based",
            Approach::None => "none",
            Approach::Error => "error",
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of answering one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,

    /// Query text that was (or would have been) executed
    pub query: Option<String>,

    /// Parameter bindings sent with the query
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,

    #[serde(default)]
    pub rows: Vec<Row>,

    /// Human-readable answer text
    pub answer: String,

    pub approach: Approach,

    /// Failure description, only for [`Approach::Error`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Answer {
    /// No query could be produced
    pub fn unanswered(question: &str) -> Self {
        Self {
            question: question.to_string(),
            query: None,
            parameters: BTreeMap::new(),
            rows: Vec::new(),
            answer: NO_QUERY_ANSWER.to_string(),
            approach: Approach::None,
            error: None,
        }
    }

    /// A query ran and its rows were formatted
    pub fn answered(
        question: &str,
        query: GraphQuery,
        rows: Vec<Row>,
        text: String,
        approach: Approach,
    ) -> Self {
        Self {
            question: question.to_string(),
            query: Some(query.text),
            parameters: query.params,
            rows,
            answer: text,
            approach,
            error: None,
        }
    }

    /// The pipeline stopped with an explicitly reported failure
    pub fn failed(question: &str, query: Option<GraphQuery>, error: impl Into<String>) -> Self {
        let error = error.into();
        let (query, parameters) = match query {
            Some(q) => (Some(q.text), q.params),
            None => (None, BTreeMap::new()),
        };
        Self {
            question: question.to_string(),
            query,
            parameters,
            rows: Vec::new(),
            answer: format!("Error processing question: {}", error),
            approach: Approach::Error,
            error: Some(error),
        }
    }
}
