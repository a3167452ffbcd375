// ABOUTME: Schema Inspector (C4) — enumerate tables/columns/FULLTEXT indexes, row estimates
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! For a given pooled connection: `SHOW TABLES`, `DESCRIBE`, `SHOW INDEX`
//! grouped into composite FULLTEXT indexes, and `information_schema` row
//! estimates (§4.4). Caching of the result is optional and governed by C6;
//! this module only performs the live inspection.

use crate::errors::AppResult;
use crate::models::{is_searchable_type, ColumnInfo, FulltextIndex, TableSchema};
use sqlx::mysql::MySqlPool;
use sqlx::Row;
use std::collections::BTreeMap;

/// List user tables in `database` (`SHOW TABLES`).
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_tables(pool: &MySqlPool, database: &str) -> AppResult<Vec<String>> {
    let rows = sqlx::query(&format!("SHOW TABLES FROM `{}`", escape_identifier(database)))
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String, _>(0).map_err(Into::into))
        .collect()
}

/// Full discovery for one `(database, table)` pair: columns, FULLTEXT
/// indexes, and a row estimate.
///
/// # Errors
///
/// Returns an error if any underlying query fails.
pub async fn inspect_table(pool: &MySqlPool, database: &str, table: &str) -> AppResult<TableSchema> {
    let columns = describe_columns(pool, database, table).await?;
    let fulltext_indexes = fulltext_indexes(pool, database, table).await?;
    let estimated_rows = estimate_rows(pool, database, table).await?;

    let indexed: std::collections::HashSet<&str> = fulltext_indexes
        .iter()
        .flat_map(|idx| idx.columns.iter().map(String::as_str))
        .collect();

    let columns = columns
        .into_iter()
        .map(|mut c| {
            c.is_fulltext_indexed = indexed.contains(c.name.as_str());
            c
        })
        .collect();

    Ok(TableSchema {
        database: database.to_owned(),
        table: table.to_owned(),
        columns,
        fulltext_indexes,
        estimated_rows,
        last_analyzed: chrono::Utc::now(),
    })
}

async fn describe_columns(pool: &MySqlPool, database: &str, table: &str) -> AppResult<Vec<ColumnInfo>> {
    let rows = sqlx::query(&format!(
        "DESCRIBE `{}`.`{}`",
        escape_identifier(database),
        escape_identifier(table)
    ))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let name: String = row.try_get("Field")?;
            let field_type: String = row.try_get("Type")?;
            Ok(ColumnInfo {
                is_searchable: is_searchable_type(&field_type),
                name,
                r#type: field_type,
                is_fulltext_indexed: false,
            })
        })
        .collect::<sqlx::Result<_>>()
        .map_err(Into::into)
}

/// Groups `SHOW INDEX` rows by `Key_name`, keeping only `Index_type = 'FULLTEXT'` (§4.4).
async fn fulltext_indexes(pool: &MySqlPool, database: &str, table: &str) -> AppResult<Vec<FulltextIndex>> {
    let rows = sqlx::query(&format!(
        "SHOW INDEX FROM `{}`.`{}`",
        escape_identifier(database),
        escape_identifier(table)
    ))
    .fetch_all(pool)
    .await?;

    let mut grouped: BTreeMap<String, Vec<(i64, String)>> = BTreeMap::new();
    for row in &rows {
        let index_type: String = row.try_get("Index_type")?;
        if !index_type.eq_ignore_ascii_case("FULLTEXT") {
            continue;
        }
        let key_name: String = row.try_get("Key_name")?;
        let seq: i64 = row.try_get("Seq_in_index")?;
        let column_name: String = row.try_get("Column_name")?;
        grouped.entry(key_name).or_default().push((seq, column_name));
    }

    Ok(grouped
        .into_iter()
        .map(|(name, mut cols)| {
            cols.sort_by_key(|(seq, _)| *seq);
            FulltextIndex {
                name,
                columns: cols.into_iter().map(|(_, c)| c).collect(),
            }
        })
        .collect())
}

async fn estimate_rows(pool: &MySqlPool, database: &str, table: &str) -> AppResult<u64> {
    let row = sqlx::query(
        "SELECT TABLE_ROWS FROM information_schema.TABLES
         WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?",
    )
    .bind(database)
    .bind(table)
    .fetch_optional(pool)
    .await?;

    Ok(row
        .and_then(|r| r.try_get::<Option<i64>, _>("TABLE_ROWS").ok().flatten())
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0))
}

/// Backtick-identifier escaping: doubles embedded backticks (§6).
#[must_use]
pub fn escape_identifier(identifier: &str) -> String {
    identifier.replace('`', "``")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_embedded_backticks() {
        assert_eq!(escape_identifier("normal"), "normal");
        assert_eq!(escape_identifier("weird`name"), "weird``name");
    }
}
