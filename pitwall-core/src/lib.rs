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

//! Pitwall Core
//!
//! Shared data model for the temporal fact-graph question answering engine:
//! temporal qualifiers, graph queries, result rows, answers and schema hints.

pub mod answer;
pub mod query;
pub mod row;
pub mod schema;
pub mod temporal;

pub use answer::{Answer, Approach, NO_QUERY_ANSWER, NO_RESULTS_ANSWER};
pub use query::{GraphQuery, ParamValue, QueryOrigin};
pub use row::Row;
pub use schema::{SchemaHints, ENTITY_LABEL, RELATION_TYPE};
pub use temporal::{
    ResultPolicy, SortOrder, TemporalQualifier, Year, YearError, MAX_YEAR, MIN_YEAR,
    RELATIVE_RESULT_LIMIT,
};
