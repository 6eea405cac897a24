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

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pitwall_core::Answer;
use pitwall_graph::{collect_stats, Executor, GraphStore, Neo4jStore};
use pitwall_llm::LlmProvider;
use pitwall_query::QueryEngine;
use pitwall_server::{build_engine, config::PitwallConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Questions answered by `pitwall demo`
const DEMO_QUESTIONS: [&str; 9] = [
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

const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "pitwall")]
#[command(about = "Pitwall - questions over a temporal F1 fact graph", long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one question
    Ask {
        question: String,

        /// Answer with rules only
        #[arg(long)]
        no_llm: bool,

        /// Output the full answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer the built-in sample questions
    Demo {
        /// Answer with rules only
        #[arg(long)]
        no_llm: bool,
    },

    /// Verify the model key and graph connectivity
    Check,

    /// Show graph statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = PitwallConfig::load(cli.config).context("Failed to load configuration")?;

    match cli.command {
        Commands::Ask {
            question,
            no_llm,
            json,
        } => {
            let engine = open_engine(&config, no_llm).await?;
            let answer = engine.answer(&question).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print_answer(&answer);
            }
            engine.shutdown().await;
        }

        Commands::Demo { no_llm } => {
            let engine = open_engine(&config, no_llm).await?;

            println!("Pitwall Demo");
            println!("============");
            for (i, question) in DEMO_QUESTIONS.iter().enumerate() {
                println!();
                println!("{}. {}", i + 1, question);
                let answer = engine.answer(question).await;
                print_answer(&answer);
            }
            engine.shutdown().await;
        }

        Commands::Check => {
            let model_ok = check_model(&config);
            let graph_ok = check_graph(&config).await;

            if model_ok && graph_ok {
                println!("✓ All checks passed");
            } else {
                anyhow::bail!("Prerequisite checks failed");
            }
        }

        Commands::Stats { json } => {
            let store = Neo4jStore::connect(&config.graph.settings())
                .await
                .with_context(|| format!("Failed to connect to Neo4j at {}", config.graph.uri))?;
            let executor =
                Executor::new(Arc::new(store)).with_timeout(config.graph.query_timeout());
            let stats = collect_stats(&executor)
                .await
                .context("Failed to collect graph statistics")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Graph Statistics");
                println!("================");
                println!("  Entities: {}", stats.entities);
                println!("  Relationships: {}", stats.relationships);
                println!("  With a year: {}", stats.temporal_relationships);
                println!("  Year range: {}", stats.year_range());
            }
        }
    }

    Ok(())
}

async fn open_engine(config: &PitwallConfig, no_llm: bool) -> Result<QueryEngine> {
    let mut config = config.clone();
    if no_llm {
        config.engine.use_fallback = false;
    }
    config.validate().context("Invalid configuration")?;
    build_engine(&config).await
}

fn print_answer(answer: &Answer) {
    println!("   Answer: {}", answer.answer);
    println!("   Approach: {}", answer.approach);
    if let Some(query) = &answer.query {
        println!("   Query: {}", query);
    }
}

fn check_model(config: &PitwallConfig) -> bool {
    if !config.engine.use_fallback {
        println!("✓ Model fallback disabled");
        return true;
    }

    match config.llm.provider {
        LlmProvider::None => {
            println!("✓ Model fallback disabled");
            true
        }
        LlmProvider::OpenAI => {
            if config.llm.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
                println!("✓ OpenAI API key found");
                true
            } else {
                println!("✗ OPENAI_API_KEY is not set");
                false
            }
        }
        LlmProvider::Ollama => {
            println!(
                "✓ Ollama model {} at {}",
                config.llm.model,
                config
                    .llm
                    .base_url
                    .as_deref()
                    .unwrap_or("http://localhost:11434")
            );
            true
        }
    }
}

async fn check_graph(config: &PitwallConfig) -> bool {
    let store = match Neo4jStore::connect(&config.graph.settings()).await {
        Ok(store) => store,
        Err(e) => {
            println!("✗ Cannot connect to Neo4j at {}: {}", config.graph.uri, e);
            return false;
        }
    };

    match tokio::time::timeout(PING_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => {
            println!("✓ Neo4j reachable at {}", store.uri());
            true
        }
        Ok(Err(e)) => {
            println!("✗ Neo4j at {} did not answer: {}", store.uri(), e);
            false
        }
        Err(_) => {
            println!("✗ Neo4j at {} timed out", store.uri());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_query::{PatternRegistry, RuleMatch};

    #[test]
    fn test_demo_questions_are_rule_based() {
        let registry = PatternRegistry::new();
        for question in DEMO_QUESTIONS {
            assert!(
                matches!(registry.match_question(question), RuleMatch::Matched { .. }),
                "{}",
                question
            );
        }
    }

    #[test]
    fn test_check_model_without_key() {
        let mut config = PitwallConfig::default();
        config.llm.api_key = None;
        assert!(!check_model(&config));

        config.llm.api_key = Some("sk-test".to_string());
        assert!(check_model(&config));

        config.llm.api_key = None;
        config.engine.use_fallback = false;
        assert!(check_model(&config));
    }

    #[test]
    fn test_cli_parses_ask() {
        let cli = Cli::try_parse_from(["pitwall", "-v", "ask", "Who won?", "--no-llm"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Ask {
                question, no_llm, ..
            } => {
                assert_eq!(question, "Who won?");
                assert!(no_llm);
            }
            _ => panic!("expected ask"),
        }
    }
}
