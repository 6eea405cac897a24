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

//! Query templates for recognized intents.
//!
//! Every template shares the same skeleton: one `MATCH` over an
//! `Entity -RELATION-> Entity` edge, a predicate filter on `r.type`, an
//! optional year filter, and the ordering/limit given by the qualifier's
//! [`ResultPolicy`](pitwall_core::ResultPolicy). Entity names are bound as
//! parameters; the year is validated before it gets here and is written
//! into the text.

use crate::rules::Intent;
use pitwall_core::{GraphQuery, SortOrder, TemporalQualifier};

const ENGINEER_FILTER: &str = "r.type CONTAINS 'engineer'";
const TEAM_FILTER: &str =
    "(r.type CONTAINS 'drove' OR r.type CONTAINS 'team' OR r.type CONTAINS 'race')";
const CHAMPION_FILTER: &str = "(r.type CONTAINS 'champion' OR r.type CONTAINS 'won')";
const DOMINANCE_FILTER: &str =
    "(r.type CONTAINS 'won' OR r.type CONTAINS 'champion' OR r.type CONTAINS 'dominated')";

struct Template {
    pattern: &'static str,
    type_filter: &'static str,
    answer: &'static str,
    /// Group rows per answer and year and rank them by fact count
    aggregate: bool,
}

/// Render the query for an intent.
pub fn build_query(intent: &Intent) -> GraphQuery {
    match intent {
        Intent::RoleHolderForSubject { subject, when } => GraphQuery::template(render(
            &Template {
                pattern: "(subject:Entity {name: $subject})-[r:RELATION]->(engineer:Entity)",
                type_filter: ENGINEER_FILTER,
                answer: "engineer.name",
                aggregate: false,
            },
            *when,
        ))
        .with_param("subject", subject.as_str()),

        Intent::SubjectsForRoleHolder { holder, when } => GraphQuery::template(render(
            &Template {
                pattern: "(engineer:Entity {name: $holder})-[r:RELATION]->(driver:Entity)",
                type_filter: ENGINEER_FILTER,
                answer: "driver.name",
                aggregate: false,
            },
            *when,
        ))
        .with_param("holder", holder.as_str()),

        Intent::TeamForDriver { driver, when } => GraphQuery::template(render(
            &Template {
                pattern: "(driver:Entity {name: $driver})-[r:RELATION]->(team:Entity)",
                type_filter: TEAM_FILTER,
                answer: "team.name",
                aggregate: false,
            },
            *when,
        ))
        .with_param("driver", driver.as_str()),

        Intent::Champion { when } => GraphQuery::template(render(
            &Template {
                pattern: "(driver:Entity)-[r:RELATION]->(championship:Entity)",
                type_filter: CHAMPION_FILTER,
                answer: "driver.name",
                aggregate: false,
            },
            *when,
        )),

        Intent::DominantTeam { when } => GraphQuery::template(render(
            &Template {
                pattern: "(team:Entity)-[r:RELATION]->(achievement:Entity)",
                type_filter: DOMINANCE_FILTER,
                answer: "team.name",
                aggregate: true,
            },
            *when,
        )),
    }
}

fn render(template: &Template, when: TemporalQualifier) -> String {
    let mut lines = vec![format!("MATCH {}", template.pattern)];

    let mut conditions = vec![template.type_filter.to_string()];
    if let Some((op, year)) = when.comparison() {
        conditions.push(format!("r.year {} {}", op, year));
    }
    lines.push(format!("WHERE {}", conditions.join(" AND ")));

    let policy = when.policy();
    if template.aggregate {
        lines.push(format!(
            "RETURN {} AS answer, r.year AS year, count(r) AS dominance_score",
            template.answer
        ));
        lines.push(match policy.order {
            Some(order) => format!("ORDER BY year {}, dominance_score DESC", order.keyword()),
            None => "ORDER BY dominance_score DESC".to_string(),
        });
    } else {
        lines.push(format!("RETURN {} AS answer, r.year AS year", template.answer));
        if let Some(order) = policy.order {
            lines.push(order_by_year(order));
        }
    }

    if let Some(limit) = policy.limit {
        lines.push(format!("LIMIT {}", limit));
    }

    lines.join("\n")
}

fn order_by_year(order: SortOrder) -> String {
    format!("ORDER BY r.year {}", order.keyword())
}
