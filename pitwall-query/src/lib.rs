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

//! Pitwall Query
//!
//! Translates natural-language questions about time-qualified facts into
//! graph queries, runs them, and renders the rows as text.
//!
//! ## Example
//!
//! ```ignore
//! let engine = QueryEngine::new(Executor::new(store));
//! let answer = engine.answer("Who won the championship in 2017?").await;
//! println!("{} ({})", answer.answer, answer.approach);
//! ```

pub mod engine;
pub mod formatter;
pub mod rules;
pub mod temporal;
pub mod templates;
pub mod validation;

pub use engine::{EngineConfig, QueryEngine};
pub use formatter::format_answer;
pub use rules::{HandlerError, Intent, PatternRegistry, RuleKind, RuleMatch};
pub use templates::build_query;
pub use validation::{validate_query, ValidationError};
