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
use crate::executor::Executor;
use pitwall_core::{GraphQuery, Row, SchemaHints};

const RELATIONSHIP_SAMPLE: i64 = 10;
const ENTITY_SAMPLE: i64 = 20;

/// Sample predicate spellings and entity names from the live graph.
pub async fn sample_schema_hints(executor: &Executor) -> GraphResult<SchemaHints> {
    let types = executor
        .try_execute(
            &GraphQuery::template(
                "MATCH ()-[r:RELATION]->() RETURN DISTINCT r.type AS value LIMIT $limit",
            )
            .with_param("limit", RELATIONSHIP_SAMPLE),
        )
        .await?;

    let entities = executor
        .try_execute(
            &GraphQuery::template("MATCH (e:Entity) RETURN e.name AS value LIMIT $limit")
                .with_param("limit", ENTITY_SAMPLE),
        )
        .await?;

    Ok(SchemaHints {
        relationship_types: strings(&types),
        sample_entities: strings(&entities),
    })
}

fn strings(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get("value").and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedStore;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sample_schema_hints() {
        let store = ScriptedStore::new()
            .respond(
                "DISTINCT r.type",
                vec![
                    Row::new().with("value", json!("drove_for")),
                    Row::new().with("value", json!(null)),
                ],
            )
            .respond(
                "e.name",
                vec![Row::new().with("value", json!("Lewis Hamilton"))],
            );
        let executor = Executor::new(Arc::new(store));

        let hints = sample_schema_hints(&executor).await.unwrap();
        assert_eq!(hints.relationship_types, vec!["drove_for".to_string()]);
        assert_eq!(hints.sample_entities, vec!["Lewis Hamilton".to_string()]);
    }

    #[tokio::test]
    async fn test_sample_schema_hints_propagates_failure() {
        let executor = Executor::new(Arc::new(ScriptedStore::new().failing("down")));
        assert!(sample_schema_hints(&executor).await.is_err());
    }
}
