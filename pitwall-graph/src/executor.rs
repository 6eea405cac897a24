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

//! Query execution with a deadline.
//!
//! Store failures never reach the caller of [`Executor::execute`]: a failed
//! or timed-out query is logged and reported as an empty result set, which
//! the formatter turns into the "no answer" message.

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;
use pitwall_core::{GraphQuery, Row};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct Executor {
    store: Arc<dyn GraphStore>,
    timeout: Duration,
}

impl Executor {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Run a query; failures and timeouts yield no rows.
    pub async fn execute(&self, query: &GraphQuery) -> Vec<Row> {
        match self.try_execute(query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    store = self.store.name(),
                    origin = ?query.origin,
                    error = %e,
                    "Graph query failed, treating as empty result"
                );
                Vec::new()
            }
        }
    }

    /// Run a query and surface the failure, for callers that need to know.
    pub async fn try_execute(&self, query: &GraphQuery) -> GraphResult<Vec<Row>> {
        debug!(query = %query.text, params = query.params.len(), "Executing graph query");

        match tokio::time::timeout(self.timeout, self.store.run(query)).await {
            Ok(result) => result,
            Err(_) => Err(GraphError::Timeout(self.timeout)),
        }
    }
}
