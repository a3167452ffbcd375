// ABOUTME: Search Orchestrator (C5) — ad-hoc row maps, snippet extraction, SearchResult shaping
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use crate::constants::search as limits;
use crate::models::SearchResult;
use serde_json::{Map, Value};
use sqlx::{Column, Row, TypeInfo};

/// Decode a MySQL row into an untyped JSON map, preserving unknown columns
/// unchanged (§9 "Ad-hoc row maps").
#[must_use]
pub fn row_to_json(row: &sqlx::mysql::MySqlRow) -> Map<String, Value> {
    let mut map = Map::with_capacity(row.columns().len());
    for (i, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, i, column.type_info().name());
        map.insert(column.name().to_owned(), value);
    }
    map
}

fn decode_column(row: &sqlx::mysql::MySqlRow, index: usize, type_name: &str) -> Value {
    match type_name {
        "TINYINT" | "SMALLINT" | "INT" | "MEDIUMINT" | "BIGINT" | "YEAR" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::from),
        "FLOAT" | "DOUBLE" | "DECIMAL" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::from),
        "BOOLEAN" | "BOOL" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::from),
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::from),
    }
}

/// `matched_columns` = row keys excluding `table_name`/`relevance_score` whose
/// values are truthy (§4.5 step 3).
#[must_use]
pub fn matched_columns(row: &Map<String, Value>) -> Vec<String> {
    row.iter()
        .filter(|(k, _)| k.as_str() != "table_name" && k.as_str() != "relevance_score")
        .filter(|(_, v)| is_truthy(v))
        .map(|(k, _)| k.clone())
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => !n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// `data` = row minus `table_name`/`relevance_score` (§4.5 step 3, invariant 3).
#[must_use]
pub fn data_without_internal_fields(row: &Map<String, Value>) -> Value {
    let mut data = row.clone();
    data.remove("table_name");
    data.remove("relevance_score");
    Value::Object(data)
}

/// First text field ≥ 50 chars containing any search term, windowed 50 chars
/// each side and bracketed by ellipses; else the first field ≥ 20 chars
/// truncated to 100 (§4.5 step 3).
#[must_use]
pub fn extract_snippet(row: &Map<String, Value>, query: &str) -> Option<String> {
    let terms: Vec<&str> = query.split_whitespace().collect();
    let text_fields: Vec<&str> = row
        .iter()
        .filter(|(k, _)| k.as_str() != "table_name" && k.as_str() != "relevance_score")
        .filter_map(|(_, v)| v.as_str())
        .collect();

    for field in &text_fields {
        let chars: Vec<char> = field.chars().collect();
        if chars.len() < limits::SNIPPET_MIN_LEN {
            continue;
        }
        let lowered: Vec<char> = field.to_lowercase().chars().collect();
        for term in &terms {
            if term.is_empty() {
                continue;
            }
            let term_chars: Vec<char> = term.to_lowercase().chars().collect();
            if let Some(pos) = find_subsequence(&lowered, &term_chars) {
                return Some(windowed_snippet(&chars, pos, term_chars.len()));
            }
        }
    }

    text_fields
        .into_iter()
        .find(|f| f.chars().count() >= limits::SNIPPET_FALLBACK_MIN_LEN)
        .map(|f| truncate_chars(f, limits::SNIPPET_FALLBACK_MAX_LEN))
}

fn find_subsequence(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Window = 50 chars before + term + 50 chars after, bracketed by ellipses (§4.5 step 3).
fn windowed_snippet(chars: &[char], term_pos: usize, term_len: usize) -> String {
    let window = limits::SNIPPET_WINDOW;
    let start = term_pos.saturating_sub(window);
    let end = (term_pos + term_len + window).min(chars.len());
    format!("...{}...", chars[start..end].iter().collect::<String>())
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Build a synthetic, response-unique result id: `database_table_index` (§3).
#[must_use]
pub fn synthetic_id(database: &str, table: &str, index: usize) -> String {
    format!("{database}_{table}_{index}")
}

/// Shape one fan-out row into a [`SearchResult`] (§4.5 step 3, §9 two-pass transform).
#[must_use]
pub fn to_search_result(
    row: &Map<String, Value>,
    database: &str,
    table: &str,
    index: usize,
    query: &str,
) -> SearchResult {
    let relevance_score = row.get("relevance_score").and_then(Value::as_f64).unwrap_or(0.0);
    SearchResult {
        id: synthetic_id(database, table, index),
        database: database.to_owned(),
        table: table.to_owned(),
        matched_columns: matched_columns(row),
        relevance_score,
        snippet: extract_snippet(row, query),
        data: data_without_internal_fields(row),
        categories: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "table_name": "notes",
            "relevance_score": 0.75,
            "title": "Rust search engines",
            "body": "a".repeat(60),
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn matched_columns_excludes_internal_fields_and_falsy_values() {
        let row = sample_row();
        let matched = matched_columns(&row);
        assert!(matched.contains(&"title".to_owned()));
        assert!(!matched.contains(&"table_name".to_owned()));
        assert!(!matched.contains(&"relevance_score".to_owned()));
    }

    #[test]
    fn data_excludes_table_name_and_relevance_score() {
        let row = sample_row();
        let data = data_without_internal_fields(&row);
        let obj = data.as_object().unwrap();
        assert!(!obj.contains_key("table_name"));
        assert!(!obj.contains_key("relevance_score"));
        assert!(obj.contains_key("title"));
    }

    #[test]
    fn snippet_falls_back_to_first_long_text_field() {
        let row = sample_row();
        let snippet = extract_snippet(&row, "nomatch").unwrap();
        assert!(snippet.chars().count() <= 100);
    }
}
