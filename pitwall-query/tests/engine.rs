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

//! End-to-end question answering against scripted store and model doubles.

use pitwall_core::{Approach, ParamValue, Row, NO_QUERY_ANSWER, NO_RESULTS_ANSWER};
use pitwall_graph::{Executor, ScriptedStore};
use pitwall_llm::{FallbackGenerator, ScriptedModel};
use pitwall_query::{EngineConfig, QueryEngine};
use serde_json::json;
use std::sync::Arc;

const GENERATED: &str = "MATCH (p:Entity {name: 'Toto Wolff'})-[r:RELATION]->(t:Entity) \
                         WHERE r.type CONTAINS 'principal' RETURN t.name AS answer, r.year AS year";

fn f1_store() -> ScriptedStore {
    ScriptedStore::new()
        .respond(
            "CONTAINS 'engineer'",
            vec![Row::new()
                .with("answer", json!("Peter Bonnington"))
                .with("year", json!(2017))],
        )
        .respond(
            "CONTAINS 'drove'",
            vec![
                Row::new().with("answer", json!("Red Bull Racing")).with("year", json!(2019)),
                Row::new().with("answer", json!("Red Bull Racing")).with("year", json!(2020)),
            ],
        )
        .respond(
            "dominance_score",
            vec![Row::new()
                .with("answer", json!("Mercedes"))
                .with("year", json!(2020))
                .with("dominance_score", json!(13))],
        )
        .respond(
            "CONTAINS 'champion'",
            vec![Row::new()
                .with("answer", json!("Lewis Hamilton"))
                .with("year", json!(2017))],
        )
        .respond(
            "'principal'",
            vec![Row::new().with("answer", json!("Mercedes")).with("year", json!(2013))],
        )
}

struct Harness {
    store: Arc<ScriptedStore>,
    model: Arc<ScriptedModel>,
    engine: QueryEngine,
}

fn harness(store: ScriptedStore, model: ScriptedModel, config: EngineConfig) -> Harness {
    let store = Arc::new(store);
    let model = Arc::new(model);
    let engine = QueryEngine::new(Executor::new(store.clone()))
        .with_fallback(FallbackGenerator::new(model.clone()))
        .with_config(config);
    Harness {
        store,
        model,
        engine,
    }
}

fn default_harness() -> Harness {
    harness(
        f1_store(),
        ScriptedModel::replying(GENERATED),
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn test_rule_preferred_over_available_model() {
    let h = default_harness();

    let answer = h
        .engine
        .answer("Who was Lewis Hamilton's race engineer in 2017?")
        .await;

    assert_eq!(answer.approach, Approach::RuleBased);
    assert_eq!(answer.answer, "Peter Bonnington (in 2017)");
    assert_eq!(
        answer.parameters.get("subject"),
        Some(&ParamValue::Text("Lewis Hamilton".to_string()))
    );
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_absolute_champion_question() {
    let h = default_harness();

    let answer = h.engine.answer("Who won the championship in 2017?").await;
    let query = answer.query.clone().unwrap();

    assert_eq!(answer.approach, Approach::RuleBased);
    assert!(query.contains("r.year = 2017"));
    assert!(query.contains("'champion'") && query.contains("'won'"));
    assert!(!query.contains("LIMIT"));
    assert_eq!(answer.answer, "Lewis Hamilton (in 2017)");
}

#[tokio::test]
async fn test_relative_team_question() {
    let h = default_harness();

    let answer = h
        .engine
        .answer("What team did Max Verstappen drive for after 2018?")
        .await;
    let query = answer.query.clone().unwrap();

    assert!(query.contains("r.year > 2018"));
    assert!(query.contains("ORDER BY r.year ASC"));
    assert!(query.ends_with("LIMIT 5"));
    assert_eq!(answer.answer, "Red Bull Racing (2019); Red Bull Racing (2020)");
    assert_eq!(answer.rows.len(), 2);
}

#[tokio::test]
async fn test_dominant_team_question() {
    let h = default_harness();

    let answer = h.engine.answer("Which team dominated the 2020 season?").await;

    assert_eq!(answer.approach, Approach::RuleBased);
    assert_eq!(answer.answer, "Mercedes (in 2020)");
    assert_eq!(answer.rows[0].get("dominance_score"), Some(&json!(13)));
}

#[tokio::test]
async fn test_unrecognized_without_fallback() {
    let store = Arc::new(f1_store());
    let engine = QueryEngine::new(Executor::new(store.clone()));

    let answer = engine.answer("How many laps are in Monaco?").await;

    assert_eq!(answer.approach, Approach::None);
    assert_eq!(answer.answer, NO_QUERY_ANSWER);
    assert!(answer.query.is_none());
    assert!(store.queries().is_empty());
}

#[tokio::test]
async fn test_fallback_generates_query() {
    let h = default_harness();

    let answer = h.engine.answer("Which team did Toto Wolff lead?").await;

    assert_eq!(answer.approach, Approach::LlmBased);
    assert_eq!(answer.query.as_deref(), Some(GENERATED));
    assert_eq!(answer.answer, "Mercedes (in 2013)");
    assert_eq!(h.model.calls(), 1);
    assert_eq!(h.store.queries()[0].text, GENERATED);
}

#[tokio::test]
async fn test_fallback_disabled_per_call() {
    let h = default_harness();

    let answer = h
        .engine
        .answer_with("Which team did Toto Wolff lead?", false)
        .await;

    assert_eq!(answer.approach, Approach::None);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_invalid_generated_query_is_not_executed() {
    let h = harness(
        f1_store(),
        ScriptedModel::replying("```\nMATCH (n:Entity) DETACH DELETE n\n```"),
        EngineConfig::default(),
    );

    let answer = h.engine.answer("Please clean the graph").await;

    assert_eq!(answer.approach, Approach::Error);
    assert_eq!(answer.query.as_deref(), Some("MATCH (n:Entity) DETACH DELETE n"));
    assert!(answer.error.unwrap().contains("DETACH"));
    assert!(h.store.queries().is_empty());
}

#[tokio::test]
async fn test_unvalidated_generated_query_fails_safely() {
    let h = harness(
        f1_store().failing("Invalid input 'SELECT'"),
        ScriptedModel::replying("SELECT * FROM drivers"),
        EngineConfig {
            use_fallback: true,
            validate_generated: false,
        },
    );

    let answer = h.engine.answer("List all drivers").await;

    assert_eq!(answer.approach, Approach::LlmBased);
    assert_eq!(answer.answer, NO_RESULTS_ANSWER);
    assert!(answer.rows.is_empty());
    assert_eq!(h.store.queries().len(), 1);
}

#[tokio::test]
async fn test_model_failure_yields_none() {
    let h = harness(
        f1_store(),
        ScriptedModel::failing("upstream unavailable"),
        EngineConfig::default(),
    );

    let answer = h.engine.answer("Who is the fastest driver ever?").await;

    assert_eq!(answer.approach, Approach::None);
    assert_eq!(answer.answer, NO_QUERY_ANSWER);
}

#[tokio::test]
async fn test_empty_model_output_yields_none() {
    let h = harness(f1_store(), ScriptedModel::replying("   "), EngineConfig::default());

    let answer = h.engine.answer("Who is the fastest driver ever?").await;

    assert_eq!(answer.approach, Approach::None);
    assert!(h.store.queries().is_empty());
}

#[tokio::test]
async fn test_rejected_rule_does_not_retry_other_rules() {
    let store = Arc::new(f1_store());
    let engine = QueryEngine::new(Executor::new(store.clone()));

    let answer = engine.answer("Who won the championship in 1900?").await;

    assert_eq!(answer.approach, Approach::None);
    assert!(store.queries().is_empty());
}

#[tokio::test]
async fn test_relative_year_out_of_range_is_not_answered() {
    let store = Arc::new(f1_store());
    let engine = QueryEngine::new(Executor::new(store.clone()));

    let answer = engine.answer("Who won the championship after 2040?").await;

    assert_eq!(answer.approach, Approach::None);
    assert_eq!(answer.answer, NO_QUERY_ANSWER);
    assert!(answer.query.is_none());
    assert!(store.queries().is_empty());
}

#[tokio::test]
async fn test_rejected_rule_may_still_use_model() {
    let h = default_harness();

    let answer = h.engine.answer("Who won the championship in 1900?").await;

    assert_eq!(answer.approach, Approach::LlmBased);
    assert_eq!(h.model.calls(), 1);
}

#[tokio::test]
async fn test_store_failure_yields_apology() {
    let h = harness(
        ScriptedStore::new().failing("connection refused"),
        ScriptedModel::replying(GENERATED),
        EngineConfig::default(),
    );

    let answer = h.engine.answer("Who won the championship in 2017?").await;

    assert_eq!(answer.approach, Approach::RuleBased);
    assert_eq!(answer.answer, NO_RESULTS_ANSWER);
    assert!(answer.query.is_some());
}

#[tokio::test]
async fn test_concurrent_questions() {
    let store = Arc::new(f1_store());
    let engine = Arc::new(QueryEngine::new(Executor::new(store.clone())));

    let questions = [
        "Who was Peter Bonnington race engineer for before 2024?",
        "Who was Lewis Hamilton's race engineer in 2017?",
        "What team did Max Verstappen drive for in 2020?",
        "Who won the championship in 2017?",
        "Which team dominated the 2020 season?",
        "Who was Lewis Hamilton's race engineer before 2017?",
        "What team did Max Verstappen drive for after 2018?",
        "Who won the championship before 2020?",
        "Which team dominated the season after 2015?",
    ];

    let handles = questions.iter().map(|q| {
        let engine = engine.clone();
        let question = q.to_string();
        tokio::spawn(async move { engine.answer(&question).await })
    });
    let answers = futures::future::join_all(handles).await;

    assert_eq!(answers.len(), questions.len());
    for (answer, question) in answers.into_iter().zip(questions) {
        let answer = answer.unwrap();
        assert_eq!(answer.question, question);
        assert_eq!(answer.approach, Approach::RuleBased, "{}", question);
        assert_ne!(answer.answer, NO_RESULTS_ANSWER, "{}", question);
    }
    assert_eq!(store.queries().len(), questions.len());

    match Arc::try_unwrap(engine) {
        Ok(engine) => engine.shutdown().await,
        Err(_) => panic!("engine still shared"),
    }
}
