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

//! Pitwall Graph
//!
//! Access to the fact graph. The storage engine is a black box behind
//! [`GraphStore`]; [`Executor`] is the only path the query pipeline uses and
//! it never returns an error.

pub mod error;
pub mod executor;
pub mod neo4j;
pub mod schema;
pub mod scripted;
pub mod stats;
pub mod store;

pub use error::{GraphError, GraphResult};
pub use executor::Executor;
pub use neo4j::{Neo4jSettings, Neo4jStore};
pub use schema::sample_schema_hints;
pub use scripted::ScriptedStore;
pub use stats::{collect_stats, GraphStats};
pub use store::GraphStore;
