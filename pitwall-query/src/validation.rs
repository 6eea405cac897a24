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

//! Structural checks for model-written queries.
//!
//! This is not a parser. It rejects text that is obviously not a single
//! read-only query over the fact graph before the store ever sees it.

use once_cell::sync::Lazy;
use pitwall_core::{ENTITY_LABEL, RELATION_TYPE};
use regex::Regex;
use thiserror::Error;

static WRITE_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(CREATE|MERGE|DELETE|DETACH|SET|REMOVE|DROP|LOAD\s+CSV|FOREACH|CALL)\b")
        .unwrap()
});

static MATCH_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bMATCH\b").unwrap());

static RETURN_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bRETURN\b").unwrap());

/// Labels on a node pattern: `(n:Entity)`, `(:Entity:Other)`
static NODE_LABELS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*(?:[A-Za-z_]\w*)?\s*((?::\s*[A-Za-z_]\w*\s*)+)").unwrap()
});

/// Types on a relationship pattern: `[r:RELATION]`, `[:A|B*1..2]`
static REL_TYPES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*(?:[A-Za-z_]\w*)?\s*:\s*([A-Za-z_][\w\s|:]*)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("query is empty")]
    Empty,

    #[error("unbalanced '{0}'")]
    Unbalanced(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("more than one statement")]
    MultipleStatements,

    #[error("write clause '{0}' is not allowed")]
    WriteClause(String),

    #[error("missing {0} clause")]
    MissingClause(&'static str),

    #[error("unknown node label '{0}'")]
    UnknownLabel(String),

    #[error("unknown relationship type '{0}'")]
    UnknownRelationship(String),
}

/// Check a generated query. Returns the first problem found.
pub fn validate_query(text: &str) -> Result<(), ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }

    let code = strip_literals(text)?;

    if let Some(clause) = write_clause(&code) {
        return Err(ValidationError::WriteClause(clause));
    }
    if !MATCH_CLAUSE.is_match(&code) {
        return Err(ValidationError::MissingClause("MATCH"));
    }
    if !RETURN_CLAUSE.is_match(&code) {
        return Err(ValidationError::MissingClause("RETURN"));
    }

    for caps in NODE_LABELS.captures_iter(&code) {
        for label in caps[1].split(':').map(str::trim).filter(|l| !l.is_empty()) {
            if label != ENTITY_LABEL {
                return Err(ValidationError::UnknownLabel(label.to_string()));
            }
        }
    }

    for caps in REL_TYPES.captures_iter(&code) {
        for rel in caps[1]
            .split(|c| c == '|' || c == ':')
            .map(str::trim)
            .filter(|r| !r.is_empty())
        {
            if rel != RELATION_TYPE {
                return Err(ValidationError::UnknownRelationship(rel.to_string()));
            }
        }
    }

    Ok(())
}

/// First write keyword in clause position. Property keys (`r.set`) and
/// aliases (`AS remove`) are identifiers, not clauses.
fn write_clause(code: &str) -> Option<String> {
    WRITE_CLAUSE
        .find_iter(code)
        .find(|m| {
            let before = code[..m.start()].trim_end();
            let previous_word = before
                .rsplit(|c: char| !(c.is_alphanumeric() || c == '_'))
                .next()
                .unwrap_or("");
            !before.ends_with('.') && !previous_word.eq_ignore_ascii_case("AS")
        })
        .map(|m| m.as_str().to_uppercase())
}

/// Blank out string literals and comments, checking delimiter balance on the
/// way. The result has the same structure with no quoted content left.
fn strip_literals(text: &str) -> Result<String, ValidationError> {
    let mut code = String::with_capacity(text.len());
    let mut stack: Vec<char> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut statement_ended = false;

    while let Some(c) = chars.next() {
        if statement_ended && !c.is_whitespace() {
            return Err(ValidationError::MultipleStatements);
        }

        match c {
            '\'' | '"' | '`' => {
                let quote = c;
                let mut literal = String::new();
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                        continue;
                    }
                    if inner == quote {
                        closed = true;
                        break;
                    }
                    literal.push(inner);
                }
                if !closed {
                    return Err(ValidationError::UnterminatedString);
                }
                if quote == '`' {
                    // escaped identifier: labels and types must still be checked
                    code.push_str(&literal);
                } else {
                    code.push_str("''");
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
                code.push('\n');
            }
            '(' | '[' | '{' => {
                stack.push(c);
                code.push(c);
            }
            ')' | ']' | '}' => {
                let open = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(open) {
                    return Err(ValidationError::Unbalanced(c));
                }
                code.push(c);
            }
            ';' => statement_ended = true,
            _ => code.push(c),
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ValidationError::Unbalanced(open));
    }

    Ok(code)
}
