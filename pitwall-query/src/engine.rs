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

//! Question answering pipeline
//!
//! ```text
//! question ──► PatternRegistry ──► Intent ──► template query ─┐
//!                   │ no match / rejected                      │
//!                   └──► FallbackGenerator ──► validator ──────┤
//!                                                              ▼
//!                                    Executor ──► rows ──► formatter ──► Answer
//! ```
//!
//! `answer` never fails. Every path ends in an [`Answer`] whose approach
//! tells the caller which branch produced it.

use crate::formatter::format_answer;
use crate::rules::{PatternRegistry, RuleMatch};
use crate::templates::build_query;
use crate::validation::validate_query;
use pitwall_core::{Answer, Approach, GraphQuery};
use pitwall_graph::Executor;
use pitwall_llm::{CacheStats, FallbackError, FallbackGenerator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn, Instrument};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Consult the model when no rule matches
    #[serde(default = "default_true")]
    pub use_fallback: bool,

    /// Check generated queries before they reach the store
    #[serde(default = "default_true")]
    pub validate_generated: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            use_fallback: true,
            validate_generated: true,
        }
    }
}

pub struct QueryEngine {
    registry: PatternRegistry,
    executor: Executor,
    fallback: Option<FallbackGenerator>,
    config: EngineConfig,
}

/// Where the query for a question came from
enum Planned {
    Query(GraphQuery, Approach),
    Unanswerable,
    Rejected(GraphQuery, String),
}

impl QueryEngine {
    pub fn new(executor: Executor) -> Self {
        Self {
            registry: PatternRegistry::new(),
            executor,
            fallback: None,
            config: EngineConfig::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackGenerator) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn fallback_cache_stats(&self) -> Option<CacheStats> {
        self.fallback.as_ref().and_then(FallbackGenerator::cache_stats)
    }

    /// Answer with the configured fallback setting.
    pub async fn answer(&self, question: &str) -> Answer {
        self.answer_with(question, self.config.use_fallback).await
    }

    /// Answer, choosing per call whether the model may be consulted.
    pub async fn answer_with(&self, question: &str, use_fallback: bool) -> Answer {
        let question = question.trim();
        let span = info_span!("answer", question = %question);

        async move {
            let (query, approach) = match self.plan(question, use_fallback).await {
                Planned::Query(query, approach) => (query, approach),
                Planned::Unanswerable => {
                    info!(approach = %Approach::None, "No query for question");
                    return Answer::unanswered(question);
                }
                Planned::Rejected(query, reason) => {
                    warn!(reason = %reason, "Generated query rejected");
                    return Answer::failed(
                        question,
                        Some(query),
                        format!("generated query rejected: {}", reason),
                    );
                }
            };

            debug!(approach = %approach, query = %query.text, "Executing query");
            let rows = self.executor.execute(&query).await;
            let text = format_answer(&rows);

            info!(approach = %approach, rows = rows.len(), "Answered question");
            Answer::answered(question, query, rows, text, approach)
        }
        .instrument(span)
        .await
    }

    /// Rule-based query for a question, without touching the store.
    pub fn rule_query(&self, question: &str) -> Option<GraphQuery> {
        self.registry
            .match_question(question)
            .intent()
            .map(build_query)
    }

    async fn plan(&self, question: &str, use_fallback: bool) -> Planned {
        if question.is_empty() {
            return Planned::Unanswerable;
        }

        match self.registry.match_question(question) {
            RuleMatch::Matched { rule, intent } => {
                debug!(rule = %rule, when = %intent.when(), "Rule matched");
                return Planned::Query(build_query(&intent), Approach::RuleBased);
            }
            RuleMatch::Rejected { rule, error } => {
                warn!(rule = %rule, error = %error, "Rule matched but its captures were unusable");
            }
            RuleMatch::NoMatch => debug!("No rule matched"),
        }

        let fallback = match (&self.fallback, use_fallback) {
            (Some(fallback), true) => fallback,
            _ => return Planned::Unanswerable,
        };

        match fallback.generate(question).await {
            Ok(query) => {
                if self.config.validate_generated {
                    if let Err(e) = validate_query(&query.text) {
                        return Planned::Rejected(query, e.to_string());
                    }
                }
                Planned::Query(query, Approach::LlmBased)
            }
            Err(FallbackError::EmptyOutput) => {
                warn!("Model returned an empty query");
                Planned::Unanswerable
            }
            Err(FallbackError::Unavailable(e)) => {
                warn!(error = %e, "Fallback model unavailable");
                Planned::Unanswerable
            }
        }
    }

    /// Release the engine. Store and model handles close when dropped.
    pub async fn shutdown(self) {
        if let Some(stats) = self.fallback_cache_stats() {
            info!(
                hits = stats.hits,
                misses = stats.misses,
                entries = stats.entry_count,
                "Fallback cache at shutdown"
            );
        }
        info!("Query engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_core::{QueryOrigin, NO_QUERY_ANSWER};
    use pitwall_graph::ScriptedStore;
    use std::sync::Arc;

    fn engine() -> QueryEngine {
        QueryEngine::new(Executor::new(Arc::new(ScriptedStore::new())))
    }

    #[test]
    fn test_rule_query() {
        let query = engine()
            .rule_query("Who won the championship in 2017?")
            .unwrap();
        assert_eq!(query.origin, QueryOrigin::Template);
        assert!(query.text.contains("r.year = 2017"));

        assert!(engine().rule_query("What is DRS?").is_none());
    }

    #[tokio::test]
    async fn test_empty_question() {
        let answer = engine().answer("   ").await;
        assert_eq!(answer.approach, Approach::None);
        assert_eq!(answer.answer, NO_QUERY_ANSWER);
        assert!(answer.query.is_none());
    }

    #[test]
    fn test_default_config() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert!(config.use_fallback);
        assert!(config.validate_generated);
    }
}
