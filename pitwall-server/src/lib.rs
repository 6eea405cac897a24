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

//! Pitwall Server
//!
//! Configuration, engine assembly and the JSON HTTP API for answering
//! questions over the temporal fact graph.

pub mod api;
pub mod config;
pub mod logging;

use anyhow::{Context, Result};
use pitwall_core::SchemaHints;
use pitwall_graph::{sample_schema_hints, Executor, GraphStore, Neo4jStore};
use pitwall_llm::{build_client, FallbackGenerator, ModelClient};
use pitwall_query::QueryEngine;
use std::sync::Arc;

use api::AppState;
use config::PitwallConfig;

/// Connect to the graph store and model provider named by `config`.
///
/// A model provider that is selected but unusable (for example OpenAI
/// without an API key) is logged and the engine runs rule-based only. A
/// graph that cannot be reached is an error.
pub async fn build_engine(config: &PitwallConfig) -> Result<QueryEngine> {
    let store = Neo4jStore::connect(&config.graph.settings())
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", config.graph.uri))?;

    let client = if config.engine.use_fallback {
        match build_client(&config.llm) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!("Model fallback unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    Ok(assemble_engine(Arc::new(store), client, config).await)
}

/// Wire a store and optional model client into an engine.
pub async fn assemble_engine(
    store: Arc<dyn GraphStore>,
    client: Option<Arc<dyn ModelClient>>,
    config: &PitwallConfig,
) -> QueryEngine {
    let executor = Executor::new(store).with_timeout(config.graph.query_timeout());
    let mut engine = QueryEngine::new(executor.clone()).with_config(config.engine);

    if let Some(client) = client {
        let hints = if config.graph.sample_schema {
            match sample_schema_hints(&executor).await {
                Ok(sampled) => sampled.or(SchemaHints::default()),
                Err(e) => {
                    tracing::warn!("Schema sampling failed, using built-in hints: {}", e);
                    SchemaHints::default()
                }
            }
        } else {
            SchemaHints::default()
        };

        tracing::info!(
            model = client.model_name(),
            relationship_types = hints.relationship_types.len(),
            "Model fallback enabled"
        );
        let fallback = FallbackGenerator::from_settings(client, &config.llm).with_hints(hints);
        engine = engine.with_fallback(fallback);
    } else {
        tracing::info!("Model fallback disabled; rule-based answers only");
    }

    engine
}

/// Run the HTTP server until Ctrl-C.
pub async fn run_server(config: PitwallConfig) -> Result<()> {
    logging::init_tracing(logging::DEFAULT_FILTER);

    config.validate().context("Invalid configuration")?;
    let addr = config.socket_addr()?;

    tracing::info!("Starting Pitwall server");
    tracing::info!("Graph store: {}", config.graph.uri);
    tracing::info!("Model provider: {} ({})", config.llm.provider, config.llm.model);

    let engine = Arc::new(build_engine(&config).await?);

    match engine.executor().store().ping().await {
        Ok(()) => tracing::info!("Graph store reachable"),
        Err(e) => tracing::warn!("Graph store ping failed: {}", e),
    }

    let state = AppState::new(engine.clone(), config.request_timeout());
    let app = api::router(state, &config.server);

    tracing::info!("HTTP API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    match Arc::try_unwrap(engine) {
        Ok(engine) => engine.shutdown().await,
        Err(_) => tracing::warn!("Query engine still referenced at shutdown"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_core::{Approach, Row};
    use pitwall_graph::ScriptedStore;
    use pitwall_llm::ScriptedModel;
    use serde_json::json;

    #[tokio::test]
    async fn test_assemble_without_model() {
        let store = Arc::new(ScriptedStore::new());
        let engine = assemble_engine(store.clone(), None, &PitwallConfig::default()).await;

        assert!(!engine.has_fallback());
        assert!(store.queries().is_empty());
    }

    #[tokio::test]
    async fn test_assemble_samples_schema_for_prompt() {
        let store = Arc::new(
            ScriptedStore::new()
                .respond("r.type AS value", vec![Row::new().with("value", json!("mentored"))])
                .respond("e.name AS value", vec![]),
        );
        let model = Arc::new(ScriptedModel::replying(
            "MATCH (a:Entity)-[r:RELATION]->(b:Entity) RETURN b.name AS answer",
        ));

        let engine =
            assemble_engine(store.clone(), Some(model.clone()), &PitwallConfig::default()).await;
        assert!(engine.has_fallback());
        assert_eq!(store.queries().len(), 2);

        let answer = engine.answer("Who mentored Lando Norris?").await;
        assert_eq!(answer.approach, Approach::LlmBased);

        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("mentored"));
        assert!(prompt.contains("Lewis Hamilton"));
    }

    #[tokio::test]
    async fn test_assemble_skips_sampling_when_disabled() {
        let store = Arc::new(ScriptedStore::new());
        let mut config = PitwallConfig::default();
        config.graph.sample_schema = false;

        let model = Arc::new(ScriptedModel::replying("MATCH (n:Entity) RETURN n.name AS answer"));
        let engine = assemble_engine(store.clone(), Some(model), &config).await;

        assert!(engine.has_fallback());
        assert!(store.queries().is_empty());
    }
}
