// ABOUTME: File-based migration runner (§4.2) — paired up/down SQL files, batch tracking, CLI backend
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Migration runner for the metadata store (§4.2, §8 CLI contract).
//!
//! Files are named `<id>_<name>.up.sql` / `<id>_<name>.down.sql` in a single
//! directory, applied in natural-numeric `id` order. Applied migrations are
//! recorded in the `migrations` table as `(name, batch, migrated_at)`; a
//! `batch` is the set of migrations applied by one invocation, unless step
//! mode gives each file its own batch.

use anyhow::{bail, Context, Result};
use sqlx::mysql::MySqlPool;
use sqlx::Row;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One migration file pair discovered on disk.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: u64,
    pub name: String,
    pub up_path: PathBuf,
    pub down_path: PathBuf,
}

impl Migration {
    /// Full migration name as stored in the `migrations` table (`<id>_<name>`).
    #[must_use]
    pub fn stored_name(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }
}

/// A row from the `migrations` bookkeeping table.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub name: String,
    pub batch: i64,
    pub migrated_at: chrono::DateTime<chrono::Utc>,
}

/// Status of a single migration file, combining disk state with (if
/// reachable) database state. `status --path` works even when the
/// database is unreachable: files are listed with `applied: None` instead
/// of failing the whole operation (§4.2, §8 `migrate:status`).
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: Option<AppliedMigration>,
}

/// Discover migration pairs in `path`, sorted by numeric id ascending.
///
/// # Errors
///
/// Returns an error if the directory can't be read, a file name doesn't
/// parse as `<id>_<name>.{up,down}.sql`, or an `up` file has no matching
/// `down` file (or vice versa).
pub fn discover(path: &Path) -> Result<Vec<Migration>> {
    let mut ups: std::collections::BTreeMap<u64, (String, PathBuf)> = std::collections::BTreeMap::new();
    let mut downs: std::collections::BTreeMap<u64, PathBuf> = std::collections::BTreeMap::new();

    let entries = std::fs::read_dir(path)
        .with_context(|| format!("reading migrations directory {}", path.display()))?;

    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else { continue };

        if let Some(rest) = file_name.strip_suffix(".up.sql") {
            let (id, name) = parse_stem(rest)
                .with_context(|| format!("invalid migration file name: {file_name}"))?;
            ups.insert(id, (name, entry.path()));
        } else if let Some(rest) = file_name.strip_suffix(".down.sql") {
            let (id, _name) = parse_stem(rest)
                .with_context(|| format!("invalid migration file name: {file_name}"))?;
            downs.insert(id, entry.path());
        }
    }

    let mut migrations = Vec::with_capacity(ups.len());
    for (id, (name, up_path)) in ups {
        let down_path = downs
            .remove(&id)
            .with_context(|| format!("migration {id}_{name} has no matching .down.sql file"))?;
        migrations.push(Migration { id, name, up_path, down_path });
    }
    if let Some((orphan_id, _)) = downs.into_iter().next() {
        bail!("migration id {orphan_id} has a .down.sql file but no matching .up.sql file");
    }

    migrations.sort_by_key(|m| m.id);
    Ok(migrations)
}

fn parse_stem(stem: &str) -> Result<(u64, String)> {
    let (id_str, name) = stem
        .split_once('_')
        .with_context(|| format!("expected <id>_<name>, got {stem}"))?;
    let id: u64 = id_str.parse().with_context(|| format!("non-numeric migration id: {id_str}"))?;
    Ok((id, name.to_owned()))
}

/// Create the `migrations` bookkeeping table if absent. Idempotent (§8).
///
/// # Errors
///
/// Returns an error if the DDL statement fails.
pub async fn ensure_migrations_table(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            batch INT NOT NULL,
            migrated_at DATETIME NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn applied_migrations(pool: &MySqlPool) -> Result<Vec<AppliedMigration>> {
    let rows = sqlx::query("SELECT name, batch, migrated_at FROM migrations ORDER BY id ASC")
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|row| {
            Ok(AppliedMigration {
                name: row.try_get("name")?,
                batch: row.try_get("batch")?,
                migrated_at: row.try_get("migrated_at")?,
            })
        })
        .collect::<sqlx::Result<_>>()
        .map_err(Into::into)
}

async fn next_batch(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COALESCE(MAX(batch), 0) AS max_batch FROM migrations")
        .fetch_one(pool)
        .await?;
    let max_batch: i64 = row.try_get("max_batch")?;
    Ok(max_batch + 1)
}

/// Options controlling an `up` run.
#[derive(Debug, Clone, Default)]
pub struct UpOptions {
    /// Give each applied migration its own batch instead of one shared batch.
    pub step: bool,
    /// Log the SQL that would run without executing it.
    pub pretend: bool,
}

/// Apply every migration not yet recorded, in id order (`migrate`, `migrate:install`).
///
/// # Errors
///
/// Returns an error if the directory can't be read, the database is
/// unreachable, or a migration's SQL fails (the failing migration's batch
/// is not recorded; migrations applied earlier in the same call remain
/// recorded).
pub async fn up(pool: &MySqlPool, path: &Path, opts: &UpOptions) -> Result<Vec<String>> {
    ensure_migrations_table(pool).await?;
    let all = discover(path)?;
    let applied_names: std::collections::HashSet<String> =
        applied_migrations(pool).await?.into_iter().map(|a| a.name).collect();

    let pending: Vec<&Migration> =
        all.iter().filter(|m| !applied_names.contains(&m.stored_name())).collect();

    let mut batch = next_batch(pool).await?;
    let mut applied = Vec::new();

    for migration in pending {
        let sql = std::fs::read_to_string(&migration.up_path)
            .with_context(|| format!("reading {}", migration.up_path.display()))?;

        if opts.pretend {
            info!(migration = %migration.stored_name(), sql = %sql, "pretend: would apply");
            applied.push(migration.stored_name());
            continue;
        }

        run_sql_script(pool, &sql)
            .await
            .with_context(|| format!("applying migration {}", migration.stored_name()))?;

        sqlx::query("INSERT INTO migrations (name, batch, migrated_at) VALUES (?, ?, ?)")
            .bind(migration.stored_name())
            .bind(batch)
            .bind(chrono::Utc::now())
            .execute(pool)
            .await?;

        info!(migration = %migration.stored_name(), batch, "migration applied");
        applied.push(migration.stored_name());

        if opts.step {
            batch += 1;
        }
    }

    Ok(applied)
}

/// Roll back the most recent batch (or `steps` most recent migrations, reverse
/// id order within it) (`migrate:rollback`).
///
/// # Errors
///
/// Returns an error if the database is unreachable, a migration file is
/// missing, or a migration's down SQL fails.
pub async fn rollback(pool: &MySqlPool, path: &Path, steps: Option<u32>) -> Result<Vec<String>> {
    ensure_migrations_table(pool).await?;
    let all = discover(path)?;
    let applied = applied_migrations(pool).await?;
    if applied.is_empty() {
        return Ok(Vec::new());
    }

    let target_names: Vec<String> = if let Some(n) = steps {
        applied.iter().rev().take(n as usize).map(|a| a.name.clone()).collect()
    } else {
        let last_batch = applied.iter().map(|a| a.batch).max().unwrap_or(0);
        applied.iter().rev().filter(|a| a.batch == last_batch).map(|a| a.name.clone()).collect()
    };

    let mut rolled_back = Vec::new();
    for name in target_names {
        let migration = all
            .iter()
            .find(|m| m.stored_name() == name)
            .with_context(|| format!("migration file for {name} not found on disk"))?;
        let sql = std::fs::read_to_string(&migration.down_path)
            .with_context(|| format!("reading {}", migration.down_path.display()))?;
        run_sql_script(pool, &sql)
            .await
            .with_context(|| format!("rolling back migration {name}"))?;
        sqlx::query("DELETE FROM migrations WHERE name = ?").bind(&name).execute(pool).await?;
        info!(migration = %name, "migration rolled back");
        rolled_back.push(name);
    }

    Ok(rolled_back)
}

/// Roll back every applied migration (`migrate:reset`).
///
/// # Errors
///
/// Returns an error if any rollback step fails.
pub async fn reset(pool: &MySqlPool, path: &Path) -> Result<Vec<String>> {
    ensure_migrations_table(pool).await?;
    let applied = applied_migrations(pool).await?;
    rollback(pool, path, Some(applied.len() as u32)).await
}

/// Drop every non-migration table (optionally views) and re-apply everything
/// from scratch (`migrate:fresh`). Requires `force=true` when `is_production`.
///
/// # Errors
///
/// Returns an error if called in production without `force`, or if a DDL/DML
/// step fails.
pub async fn fresh(pool: &MySqlPool, path: &Path, is_production: bool, force: bool, drop_views: bool) -> Result<Vec<String>> {
    if is_production && !force {
        bail!("refusing destructive `migrate:fresh` in production without --force");
    }

    let tables = list_tables(pool).await?;
    for table in &tables {
        if table == "migrations" {
            continue;
        }
        sqlx::query(&format!("DROP TABLE IF EXISTS `{table}`")).execute(pool).await?;
    }

    if drop_views {
        let views = list_views(pool).await?;
        for view in &views {
            sqlx::query(&format!("DROP VIEW IF EXISTS `{view}`")).execute(pool).await?;
        }
    }

    ensure_migrations_table(pool).await?;
    sqlx::query("TRUNCATE TABLE migrations").execute(pool).await?;

    up(pool, path, &UpOptions::default()).await
}

/// `reset` then `up` (`migrate:refresh`). Requires `force` in production,
/// same as `fresh`, since it also performs a destructive rollback-all.
///
/// # Errors
///
/// Returns an error if called in production without `force`, or if a step fails.
pub async fn refresh(pool: &MySqlPool, path: &Path, is_production: bool, force: bool) -> Result<Vec<String>> {
    if is_production && !force {
        bail!("refusing destructive `migrate:refresh` in production without --force");
    }
    reset(pool, path).await?;
    up(pool, path, &UpOptions::default()).await
}

/// Combined disk + database status (`migrate:status`). Readable even when the
/// database is unreachable: every file is listed with `applied: None`.
///
/// # Errors
///
/// Returns an error only if the migrations directory itself can't be read.
pub async fn status(pool: Option<&MySqlPool>, path: &Path) -> Result<Vec<MigrationStatus>> {
    let all = discover(path)?;

    let applied: std::collections::HashMap<String, AppliedMigration> = match pool {
        Some(pool) => match applied_migrations(pool).await {
            Ok(rows) => rows.into_iter().map(|a| (a.name.clone(), a)).collect(),
            Err(e) => {
                warn!(error = %e, "database unreachable for migrate:status; showing disk-only state");
                std::collections::HashMap::new()
            }
        },
        None => std::collections::HashMap::new(),
    };

    Ok(all
        .into_iter()
        .map(|m| {
            let name = m.stored_name();
            let applied = applied.get(&name).cloned();
            MigrationStatus { name, applied }
        })
        .collect())
}

async fn list_tables(pool: &MySqlPool) -> Result<Vec<String>> {
    let rows = sqlx::query("SHOW TABLES").fetch_all(pool).await?;
    rows.iter().map(|row| row.try_get::<String, _>(0).map_err(Into::into)).collect()
}

async fn list_views(pool: &MySqlPool) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT TABLE_NAME FROM information_schema.VIEWS WHERE TABLE_SCHEMA = DATABASE()",
    )
    .fetch_all(pool)
    .await?;
    rows.iter().map(|row| row.try_get::<String, _>("TABLE_NAME").map_err(Into::into)).collect()
}

/// Run a `.sql` file that may contain multiple `;`-separated statements.
/// Migration files are trusted, operator-authored content — not a generic
/// SQL parser, just a naive split that's good enough for DDL scripts.
async fn run_sql_script(pool: &MySqlPool, script: &str) -> Result<()> {
    for statement in script.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("write fixture");
    }

    #[test]
    fn discovers_and_orders_paired_migrations() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "2_add_index.up.sql", "SELECT 1;");
        write(dir.path(), "2_add_index.down.sql", "SELECT 1;");
        write(dir.path(), "1_create_users.up.sql", "SELECT 1;");
        write(dir.path(), "1_create_users.down.sql", "SELECT 1;");

        let migrations = discover(dir.path()).expect("discover");
        assert_eq!(migrations.len(), 2);
        assert_eq!(migrations[0].stored_name(), "1_create_users");
        assert_eq!(migrations[1].stored_name(), "2_add_index");
    }

    #[test]
    fn missing_down_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "1_create_users.up.sql", "SELECT 1;");
        assert!(discover(dir.path()).is_err());
    }
}
