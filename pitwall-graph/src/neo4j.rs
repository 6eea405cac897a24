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

//! Bolt-protocol store backed by `neo4rs`.

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;
use neo4rs::{query, ConfigBuilder, Graph};
use pitwall_core::{GraphQuery, ParamValue, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Connection settings for a Neo4j server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_max_connections() -> usize {
    16
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
        }
    }
}

/// Pooled Neo4j client. `Graph` is internally reference counted, so one
/// store serves every concurrent request.
pub struct Neo4jStore {
    graph: Graph,
    uri: String,
}

impl Neo4jStore {
    pub async fn connect(settings: &Neo4jSettings) -> GraphResult<Self> {
        let config = ConfigBuilder::default()
            .uri(settings.uri.as_str())
            .user(settings.user.as_str())
            .password(settings.password.as_str())
            .max_connections(settings.max_connections)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(config)
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        info!(uri = %settings.uri, "Connected to Neo4j");

        Ok(Self {
            graph,
            uri: settings.uri.clone(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[async_trait::async_trait]
impl GraphStore for Neo4jStore {
    async fn run(&self, graph_query: &GraphQuery) -> GraphResult<Vec<Row>> {
        let mut q = query(&graph_query.text);
        for (name, value) in &graph_query.params {
            q = match value {
                ParamValue::Integer(n) => q.param(name, *n),
                ParamValue::Text(s) => q.param(name, s.as_str()),
            };
        }

        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(convert_row(&row)?);
        }

        debug!(rows = rows.len(), "Neo4j query complete");
        Ok(rows)
    }

    fn name(&self) -> &str {
        "neo4j"
    }
}

/// Copy a bolt row into a column-ordered [`Row`].
fn convert_row(row: &neo4rs::Row) -> GraphResult<Row> {
    row.keys()
        .into_iter()
        .map(|key| {
            let value: serde_json::Value = row
                .get(&key.value)
                .map_err(|e| GraphError::Decode(format!("{}: {}", key.value, e)))?;
            Ok((key.value.clone(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Neo4jSettings::default();
        assert_eq!(settings.uri, "bolt://localhost:7687");
        assert_eq!(settings.user, "neo4j");
        assert_eq!(settings.password, "password");
    }

    #[test]
    fn test_settings_partial_deserialize() {
        let settings: Neo4jSettings =
            serde_json::from_str(r#"{"uri": "bolt://graph:7687"}"#).unwrap();
        assert_eq!(settings.uri, "bolt://graph:7687");
        assert_eq!(settings.max_connections, 16);
    }
}
