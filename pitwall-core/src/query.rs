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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scalar bound to a `$name` placeholder in query text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Text(String),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

/// Which strategy produced a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOrigin {
    /// Built by a rule template, parameters bound
    Template,
    /// Produced by the generative model, untrusted
    Generated,
}

/// Graph query text plus its parameter bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQuery {
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
    pub origin: QueryOrigin,
}

impl GraphQuery {
    pub fn template(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
            origin: QueryOrigin::Template,
        }
    }

    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
            origin: QueryOrigin::Generated,
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn is_generated(&self) -> bool {
        self.origin == QueryOrigin::Generated
    }
}

impl fmt::Display for GraphQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_bound() {
        let q = GraphQuery::template("MATCH (d:Entity {name: $driver}) RETURN d")
            .with_param("driver", "Max Verstappen")
            .with_param("limit", 5i64);

        assert_eq!(
            q.param("driver"),
            Some(&ParamValue::Text("Max Verstappen".to_string()))
        );
        assert_eq!(q.param("limit"), Some(&ParamValue::Integer(5)));
        assert!(!q.is_generated());
        assert!(!q.text.contains("Max Verstappen"));
    }

    #[test]
    fn test_generated_has_no_params() {
        let q = GraphQuery::generated("MATCH (n) RETURN n");
        assert!(q.is_generated());
        assert!(q.params.is_empty());

        let json = serde_json::to_value(&q).unwrap();
        assert!(json.get("params").is_none());
        assert_eq!(json["origin"], "generated");
    }
}
