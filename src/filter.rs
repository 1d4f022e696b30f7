//! Filter predicates.
//!
//! Three strategies share the signature `(record, column) -> bool`: the
//! non-strict substring filter (default for text columns), the strict
//! identity filter (checkbox columns) and the number filter with an
//! optional comparison-operator prefix (number columns).
//!
//! The non-strict and number filters share the same short circuits: the
//! literal query `""` (two double-quote characters) matches only empty
//! record values, a blank query matches everything, and an empty record
//! value never matches a non-blank query. "Empty" is the canonical rule
//! from `CellValue::is_empty`: falsy and not the number 0.

use crate::column::ColumnDefinition;
use crate::value::{CellValue, Record};

/// Query literal that matches only empty record values.
const EMPTY_MATCH_QUERY: &str = "\"\"";

/// Normalized query text: the trimmed display form for truthy queries,
/// blank otherwise.
fn query_text(query: &CellValue) -> String {
    if query.is_truthy() {
        query.display_string().trim().to_string()
    } else {
        String::new()
    }
}

/// Non-strict filter: case-insensitive substring match against the
/// record value's trimmed display form.
pub fn non_strict_filter(record: &Record, column: &ColumnDefinition) -> bool {
    let query = query_text(&column.filter_query.get());
    let value = column.cell_value(record);
    if query == EMPTY_MATCH_QUERY {
        return value.is_empty();
    }
    if query.is_empty() {
        return true;
    }
    if value.is_empty() {
        return false;
    }
    value
        .display_string()
        .trim()
        .to_lowercase()
        .contains(&query.to_lowercase())
}

/// Strict filter: the record value must be identical to the query, no
/// coercion.
pub fn strict_filter(record: &Record, column: &ColumnDefinition) -> bool {
    column.cell_value(record).strict_eq(&column.filter_query.get())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberFilterOperator {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

fn compare_numbers(value: f64, query: f64, operator: NumberFilterOperator) -> bool {
    match operator {
        NumberFilterOperator::Eq => value == query,
        NumberFilterOperator::NotEq => value != query,
        NumberFilterOperator::Lt => value < query,
        NumberFilterOperator::Lte => value <= query,
        NumberFilterOperator::Gt => value > query,
        NumberFilterOperator::Gte => value >= query,
    }
}

/// Number filter. The query may be:
/// * `""` - matches empty values only,
/// * `123` - strict numeric equality,
/// * `==123` - same as above,
/// * `!=123` - everything except the given number,
/// * `<123`, `>123`, `<=123`, `>=123` - the respective comparison.
///
/// A remainder that does not parse as a number rejects every record.
pub fn number_filter(record: &Record, column: &ColumnDefinition) -> bool {
    let query = query_text(&column.filter_query.get());
    let value = column.cell_value(record);
    if query == EMPTY_MATCH_QUERY {
        return value.is_empty();
    }
    if query.is_empty() {
        return true;
    }
    if value.is_empty() {
        return false;
    }

    let char_count = query.chars().count();
    let mut operator = None;
    let mut remainder = query.as_str();
    if char_count > 2 {
        let prefix: String = query.chars().take(2).collect();
        operator = match prefix.as_str() {
            "==" => Some(NumberFilterOperator::Eq),
            "!=" => Some(NumberFilterOperator::NotEq),
            "<=" => Some(NumberFilterOperator::Lte),
            ">=" => Some(NumberFilterOperator::Gte),
            _ => None,
        };
        if operator.is_some() {
            // Matched prefixes are ASCII, so the byte split is safe.
            remainder = &query[2..];
        }
    }
    if operator.is_none() && char_count > 1 {
        operator = match query.as_bytes()[0] {
            b'<' => Some(NumberFilterOperator::Lt),
            b'>' => Some(NumberFilterOperator::Gt),
            _ => None,
        };
        if operator.is_some() {
            remainder = &query[1..];
        }
    }
    let operator = operator.unwrap_or(NumberFilterOperator::Eq);

    match remainder.trim().parse::<f64>() {
        Ok(search_number) => compare_numbers(value.to_number(), search_number, operator),
        Err(_) => false,
    }
}
