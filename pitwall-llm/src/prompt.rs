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

//! Prompt construction for query generation.

use pitwall_core::{SchemaHints, RELATIVE_RESULT_LIMIT};

pub const SYSTEM_PROMPT: &str = "You are an expert at converting natural language questions \
about Formula 1 into Cypher queries for Neo4j. Reply with a single read-only query and nothing else.";

/// Build the user prompt: schema shape, vocabulary hints, temporal rules,
/// canonical examples, then the question itself.
pub fn build_prompt(question: &str, hints: &SchemaHints) -> String {
    let relationship_types = quoted_list(&hints.relationship_types);
    let sample_entities = quoted_list(&hints.sample_entities);

    format!(
        r#"Graph Schema:
- Nodes: Entity(name)
- Relationships: RELATION(type, year, source_page, extracted_at)

Common relationship types:
- {relationship_types}

Sample entities: {sample_entities}

Convert this question to Cypher:
"{question}"

Rules:
1. Use exact entity names when possible
2. Filter by year when mentioned
3. For relative time queries:
   - "before 2020" -> r.year < 2020
   - "after 2015" -> r.year > 2015
   - Order by year DESC for "before" queries
   - Order by year ASC for "after" queries
4. Return meaningful aliases (answer, year)
5. Use CONTAINS in WHERE clause: WHERE r.type CONTAINS 'engineer'
6. Limit results to {limit} for relative time queries
7. Always use proper Cypher syntax: MATCH (a:Entity)-[r:RELATION]->(b:Entity) WHERE conditions

Example queries:
- MATCH (driver:Entity {{name: 'Lewis Hamilton'}})-[r:RELATION]->(engineer:Entity) WHERE r.type CONTAINS 'engineer' AND r.year = 2017 RETURN engineer.name AS answer, r.year AS year
- MATCH (engineer:Entity {{name: 'Peter Bonnington'}})-[r:RELATION]->(driver:Entity) WHERE r.type CONTAINS 'engineer' AND r.year < 2017 RETURN driver.name AS answer, r.year AS year ORDER BY r.year DESC LIMIT {limit}

Return only the Cypher query, nothing else:
"#,
        relationship_types = relationship_types,
        sample_entities = sample_entities,
        question = question,
        limit = RELATIVE_RESULT_LIMIT,
    )
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{}\"", item))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Remove one surrounding fenced code block, if the reply is wrapped in one.
pub fn strip_code_fence(reply: &str) -> String {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().skip(1).collect();
    if lines
        .last()
        .map(|line| line.trim_start().starts_with("```"))
        .unwrap_or(false)
    {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}
