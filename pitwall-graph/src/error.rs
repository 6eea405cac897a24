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

//! Graph store error types

use std::time::Duration;
use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised by a graph store
#[derive(Debug, Error)]
pub enum GraphError {
    /// Store could not be reached or the session failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Store rejected the query
    #[error("Query error: {0}")]
    Query(String),

    /// A returned value could not be converted
    #[error("Decode error: {0}")]
    Decode(String),

    /// Call exceeded its deadline
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Error from the bolt driver
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),
}
