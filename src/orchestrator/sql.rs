// ABOUTME: Search Orchestrator (C5) — FULLTEXT/LIKE query construction with identifier escaping
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use crate::schema_inspector::escape_identifier;

/// One constructed per-table `SELECT`, ready to union with its siblings.
pub struct TableSelect {
    pub sql: String,
    pub binds: Vec<String>,
}

fn escape_string_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn backtick(identifier: &str) -> String {
    format!("`{}`", escape_identifier(identifier))
}

/// `SELECT '<table>' as table_name, <cols>, MATCH(<cols>) AGAINST(? IN NATURAL LANGUAGE MODE)
///  AS relevance_score FROM <table> WHERE MATCH(<cols>) AGAINST(? IN NATURAL LANGUAGE MODE)` (§4.5 b).
#[must_use]
pub fn fulltext_select(table: &str, columns: &[String], query: &str) -> TableSelect {
    let cols_list = columns.iter().map(|c| backtick(c)).collect::<Vec<_>>().join(", ");
    let match_cols = cols_list.clone();
    let sql = format!(
        "SELECT '{table_lit}' as table_name, {cols_list}, MATCH({match_cols}) AGAINST(? IN NATURAL LANGUAGE MODE) AS relevance_score \
         FROM {table_ident} WHERE MATCH({match_cols}) AGAINST(? IN NATURAL LANGUAGE MODE)",
        table_lit = escape_string_literal(table),
        table_ident = backtick(table),
    );
    TableSelect { sql, binds: vec![query.to_owned(), query.to_owned()] }
}

/// `SELECT '<table>' as table_name, <cols>, 0 as relevance_score FROM <table>
///  WHERE col LIKE ? OR col LIKE ? ...` (§4.5 b').
#[must_use]
pub fn like_select(table: &str, columns: &[String], query: &str) -> TableSelect {
    let cols_list = columns.iter().map(|c| backtick(c)).collect::<Vec<_>>().join(", ");
    let clauses = columns.iter().map(|c| format!("{} LIKE ?", backtick(c))).collect::<Vec<_>>().join(" OR ");
    let sql = format!(
        "SELECT '{table_lit}' as table_name, {cols_list}, 0 as relevance_score FROM {table_ident} WHERE {clauses}",
        table_lit = escape_string_literal(table),
        table_ident = backtick(table),
    );
    let pattern = format!("%{query}%");
    TableSelect { sql, binds: columns.iter().map(|_| pattern.clone()).collect() }
}

/// Union a non-empty list of per-table selects and apply the merged
/// `ORDER BY relevance_score DESC LIMIT ? OFFSET ?` (§4.5 c).
#[must_use]
pub fn union_and_paginate(selects: Vec<TableSelect>, limit: u32, offset: u32) -> (String, Vec<String>) {
    let mut binds = Vec::new();
    let sql = selects
        .into_iter()
        .map(|select| {
            binds.extend(select.binds);
            select.sql
        })
        .collect::<Vec<_>>()
        .join(" UNION ALL ");
    let sql = format!("{sql} ORDER BY relevance_score DESC LIMIT {limit} OFFSET {offset}");
    (sql, binds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_fallback_matches_the_documented_pattern() {
        let select = like_select("notes", &["title".to_owned(), "body".to_owned()], "alpha");
        assert_eq!(
            select.sql,
            "SELECT 'notes' as table_name, `title`, `body`, 0 as relevance_score FROM `notes` WHERE `title` LIKE ? OR `body` LIKE ?"
        );
        assert_eq!(select.binds, vec!["%alpha%".to_owned(), "%alpha%".to_owned()]);
    }

    #[test]
    fn fulltext_select_escapes_identifiers() {
        let select = fulltext_select("posts", &["title".to_owned()], "rust");
        assert!(select.sql.contains("MATCH(`title`) AGAINST(? IN NATURAL LANGUAGE MODE)"));
        assert_eq!(select.binds, vec!["rust".to_owned(), "rust".to_owned()]);
    }
}
