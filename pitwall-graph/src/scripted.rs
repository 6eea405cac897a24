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

//! In-process store with canned responses.
//!
//! Responses are keyed by a substring of the query text; the first key
//! contained in the query wins. Every query is recorded so callers can
//! inspect what the pipeline sent.

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;
use pitwall_core::{GraphQuery, Row};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct ScriptedStore {
    responses: Vec<(String, Vec<Row>)>,
    failure: Option<String>,
    delay: Option<Duration>,
    seen: Mutex<Vec<GraphQuery>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `rows` for any query whose text contains `needle`.
    pub fn respond(mut self, needle: impl Into<String>, rows: Vec<Row>) -> Self {
        self.responses.push((needle.into(), rows));
        self
    }

    /// Fail every query with a store error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries received so far, in arrival order.
    pub fn queries(&self) -> Vec<GraphQuery> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl GraphStore for ScriptedStore {
    async fn run(&self, query: &GraphQuery) -> GraphResult<Vec<Row>> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(query.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(GraphError::Query(message.clone()));
        }

        Ok(self
            .responses
            .iter()
            .find(|(needle, _)| query.text.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_first_matching_needle_wins() {
        let store = ScriptedStore::new()
            .respond("engineer", vec![Row::new().with("answer", json!("Peter Bonnington"))])
            .respond("MATCH", vec![]);

        let rows = store
            .run(&GraphQuery::template("MATCH ... CONTAINS 'engineer'"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let rows = store.run(&GraphQuery::template("MATCH (n)")).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(store.queries().len(), 2);
    }
}
