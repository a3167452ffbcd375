// ABOUTME: Schema Inspector (C4) result shapes — table/column/index metadata for one connection
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One column as reported by `DESCRIBE`, classified for search eligibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub r#type: String,
    pub is_fulltext_indexed: bool,
    /// `type` contains one of `varchar|text|char|longtext|mediumtext|tinytext`.
    pub is_searchable: bool,
}

/// A `FULLTEXT` index, reconstructed by grouping `SHOW INDEX` rows by `Key_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulltextIndex {
    pub name: String,
    pub columns: Vec<String>,
}

/// Cached discovery result for one `(database, table)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub database: String,
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub fulltext_indexes: Vec<FulltextIndex>,
    pub estimated_rows: u64,
    pub last_analyzed: DateTime<Utc>,
}

impl TableSchema {
    /// Text-typed columns eligible for the LIKE fallback.
    #[must_use]
    pub fn searchable_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_searchable)
            .map(|c| c.name.as_str())
            .collect()
    }
}

const SEARCHABLE_TYPE_FRAGMENTS: &[&str] = &[
    "varchar",
    "text",
    "char",
    "longtext",
    "mediumtext",
    "tinytext",
];

/// Classify a `DESCRIBE`-reported column type as searchable (§4.4).
#[must_use]
pub fn is_searchable_type(column_type: &str) -> bool {
    let lowered = column_type.to_lowercase();
    SEARCHABLE_TYPE_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
}
