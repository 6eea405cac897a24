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

//! Graph size summary for the `stats` command and the health endpoint.

use crate::error::GraphResult;
use crate::executor::Executor;
use pitwall_core::GraphQuery;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub entities: u64,
    pub relationships: u64,
    pub temporal_relationships: u64,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
}

impl GraphStats {
    /// "1950-2024", or "N/A" when no fact carries a year.
    pub fn year_range(&self) -> String {
        match (self.min_year, self.max_year) {
            (Some(min), Some(max)) => format!("{}-{}", min, max),
            _ => "N/A".to_string(),
        }
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entities, {} relationships ({} with a year), years {}",
            self.entities,
            self.relationships,
            self.temporal_relationships,
            self.year_range()
        )
    }
}

pub async fn collect_stats(executor: &Executor) -> GraphResult<GraphStats> {
    let entities = count(executor, "MATCH (e:Entity) RETURN count(e) AS value").await?;
    let relationships =
        count(executor, "MATCH ()-[r:RELATION]->() RETURN count(r) AS value").await?;
    let temporal_relationships = count(
        executor,
        "MATCH ()-[r:RELATION]->() WHERE r.year IS NOT NULL RETURN count(r) AS value",
    )
    .await?;

    let years = executor
        .try_execute(&GraphQuery::template(
            "MATCH ()-[r:RELATION]->() WHERE r.year IS NOT NULL \
             RETURN min(r.year) AS min_year, max(r.year) AS max_year",
        ))
        .await?;
    let first = years.first();

    Ok(GraphStats {
        entities,
        relationships,
        temporal_relationships,
        min_year: first.and_then(|row| row.get("min_year")).and_then(|v| v.as_i64()),
        max_year: first.and_then(|row| row.get("max_year")).and_then(|v| v.as_i64()),
    })
}

async fn count(executor: &Executor, text: &str) -> GraphResult<u64> {
    let rows = executor.try_execute(&GraphQuery::template(text)).await?;
    Ok(rows
        .first()
        .and_then(|row| row.get("value"))
        .and_then(|v| v.as_u64())
        .unwrap_or(0))
}
