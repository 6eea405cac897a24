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

use pitwall_core::{Row, NO_RESULTS_ANSWER};
use serde_json::Value;

/// Rows listed in a multi-row answer
pub const MAX_LISTED_ROWS: usize = 5;

/// Render query rows as one answer string.
///
/// A single row reads "answer (in year)"; several rows read
/// "a1 (y1); a2 (y2)" for at most [`MAX_LISTED_ROWS`] rows. Rows without an
/// `answer` column fall back to their first column.
pub fn format_answer(rows: &[Row]) -> String {
    match rows {
        [] => NO_RESULTS_ANSWER.to_string(),
        [row] => match (row.get("answer"), truthy_year(row)) {
            (Some(answer), Some(year)) => format!("{} (in {})", render(answer), render(year)),
            (Some(answer), None) => render(answer),
            (None, _) => first_column(row),
        },
        _ => rows
            .iter()
            .take(MAX_LISTED_ROWS)
            .map(|row| match (row.get("answer"), truthy_year(row)) {
                (Some(answer), Some(year)) => format!("{} ({})", render(answer), render(year)),
                (Some(answer), None) => render(answer),
                (None, _) => first_column(row),
            })
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn truthy_year(row: &Row) -> Option<&Value> {
    row.get("year").filter(|v| is_truthy(v))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn first_column(row: &Row) -> String {
    row.first().map(render).unwrap_or_default()
}

/// Text without quotes; whole floats without a fraction.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "unknown".to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(answer: Value, year: Value) -> Row {
        Row::new().with("answer", answer).with("year", year)
    }

    #[test]
    fn test_no_rows() {
        assert_eq!(format_answer(&[]), NO_RESULTS_ANSWER);
    }

    #[test]
    fn test_single_row_with_year() {
        let rows = vec![row(json!("Peter Bonnington"), json!(2017))];
        assert_eq!(format_answer(&rows), "Peter Bonnington (in 2017)");
    }

    #[test]
    fn test_single_row_falsy_year() {
        for year in [json!(null), json!(0), json!(""), json!(false)] {
            let rows = vec![row(json!("Mercedes"), year)];
            assert_eq!(format_answer(&rows), "Mercedes");
        }
        let rows = vec![Row::new().with("answer", json!("Mercedes"))];
        assert_eq!(format_answer(&rows), "Mercedes");
    }

    #[test]
    fn test_single_row_without_answer_column() {
        let rows = vec![Row::new()
            .with("team", json!("Red Bull Racing"))
            .with("wins", json!(21))];
        assert_eq!(format_answer(&rows), "Red Bull Racing");
    }

    #[test]
    fn test_multiple_rows() {
        let rows = vec![
            row(json!("Lewis Hamilton"), json!(2019)),
            row(json!("Lewis Hamilton"), json!(2018)),
            row(json!("Nico Rosberg"), json!(2016)),
        ];
        assert_eq!(
            format_answer(&rows),
            "Lewis Hamilton (2019); Lewis Hamilton (2018); Nico Rosberg (2016)"
        );
    }

    #[test]
    fn test_multiple_rows_capped_and_mixed() {
        let mut rows: Vec<Row> = (2010..2017)
            .map(|y| row(json!(format!("Driver {}", y)), json!(y)))
            .collect();
        rows[1] = row(json!("No Year"), json!(null));
        rows[2] = Row::new().with("name", json!("Bare"));

        assert_eq!(
            format_answer(&rows),
            "Driver 2010 (2010); No Year; Bare; Driver 2013 (2013); Driver 2014 (2014)"
        );
    }

    #[test]
    fn test_render_numbers() {
        assert_eq!(render(&json!(2017)), "2017");
        assert_eq!(render(&json!(2017.0)), "2017");
        assert_eq!(render(&json!(0.5)), "0.5");
        assert_eq!(render(&json!(true)), "true");
    }
}
