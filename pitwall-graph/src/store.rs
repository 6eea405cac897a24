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

use crate::error::GraphResult;
use pitwall_core::{GraphQuery, Row};

/// A graph database that runs query text with bound parameters.
///
/// Implementations must be safe to share across concurrent requests; the
/// engine holds one instance behind an `Arc` for the life of the process.
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a query and collect every row.
    async fn run(&self, query: &GraphQuery) -> GraphResult<Vec<Row>>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> GraphResult<()> {
        self.run(&GraphQuery::template("RETURN 1 AS ok"))
            .await
            .map(|_| ())
    }

    /// Human-readable backend name for logs.
    fn name(&self) -> &str;
}
