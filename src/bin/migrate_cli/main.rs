// ABOUTME: altus4-cli - migration management for the metadata store
// ABOUTME: Implements migrate/migrate:install/migrate:status/migrate:rollback/migrate:reset/
// ABOUTME: migrate:refresh/migrate:fresh/migrate:up/migrate:down with their documented flags
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
//!
//! Usage:
//! ```bash
//! # Apply every pending migration
//! altus4-cli migrate --path migrations
//!
//! # Same as `migrate`, for first-time setup
//! altus4-cli migrate:install --path migrations
//!
//! # Show disk/database state
//! altus4-cli migrate:status --path migrations
//!
//! # Roll back the last batch, or the last N steps
//! altus4-cli migrate:rollback --path migrations --step 2
//!
//! # Roll back everything applied
//! altus4-cli migrate:reset --path migrations
//!
//! # Drop all non-migration tables and re-apply from scratch
//! altus4-cli migrate:fresh --path migrations --force
//!
//! # reset then up
//! altus4-cli migrate:refresh --path migrations --force
//! ```

use altus4_server::config::environment::ServerConfig;
use altus4_server::metadata_store::MetadataStore;
use altus4_server::migrations::{self, UpOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "altus4-cli",
    about = "Altus4 migration management CLI",
    long_about = "Applies, inspects, and rolls back file-based schema migrations against the metadata store."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Migration file directory
    #[arg(long, global = true, default_value = "migrations")]
    path: PathBuf,

    /// Database URL override (defaults to the environment's `DATABASE_URL`/`DB_*` vars)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Apply every migration not yet recorded
    Migrate(UpArgs),
    /// Alias for `migrate`, for first-time setup
    #[command(name = "migrate:install")]
    MigrateInstall(UpArgs),
    /// Show disk/database migration state
    #[command(name = "migrate:status")]
    MigrateStatus,
    /// Roll back the most recent batch, or `--step N` most recent migrations
    #[command(name = "migrate:rollback")]
    MigrateRollback(RollbackArgs),
    /// Roll back every applied migration
    #[command(name = "migrate:reset")]
    MigrateReset(ForceArgs),
    /// Drop all non-migration tables (optionally views) and re-apply from scratch
    #[command(name = "migrate:fresh")]
    MigrateFresh(FreshArgs),
    /// `migrate:reset` then `migrate`
    #[command(name = "migrate:refresh")]
    MigrateRefresh(ForceArgs),
    /// Apply a single migration by id
    #[command(name = "migrate:up")]
    MigrateUp {
        #[arg(long = "file")]
        file: u64,
        #[arg(long)]
        pretend: bool,
    },
    /// Roll back a single migration by id, or the most recent if omitted
    #[command(name = "migrate:down")]
    MigrateDown {
        #[arg(long = "file")]
        file: Option<u64>,
    },
}

#[derive(clap::Args)]
struct UpArgs {
    /// Give each migration its own batch
    #[arg(long)]
    step: bool,
    /// Log the SQL that would run without executing it
    #[arg(long)]
    pretend: bool,
    /// Seed data after migrating (reserved; no-op until seed scripts exist)
    #[arg(long)]
    seed: bool,
}

#[derive(clap::Args)]
struct RollbackArgs {
    /// Roll back the N most recent migrations instead of the last batch
    #[arg(long)]
    step: Option<u32>,
}

#[derive(clap::Args)]
struct ForceArgs {
    /// Required to run a destructive operation when `ENV=production`
    #[arg(long)]
    force: bool,
}

#[derive(clap::Args)]
struct FreshArgs {
    #[arg(long)]
    force: bool,
    /// Also drop views, not just tables
    #[arg(long)]
    drop_views: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // `migrate:status` must still work when the database is unreachable (§4.2).
    if matches!(cli.command, Command::MigrateStatus) {
        let pool = connect(&cli.database).await.ok();
        let statuses = migrations::status(pool.as_ref(), &cli.path).await?;
        print_status(&statuses);
        return Ok(());
    }

    let pool = connect(&cli.database).await?;
    let is_production = ServerConfig::from_env().map_or(false, |c| c.env.is_production());

    match cli.command {
        Command::Migrate(args) | Command::MigrateInstall(args) => {
            let opts = UpOptions { step: args.step, pretend: args.pretend };
            let applied = migrations::up(&pool, &cli.path, &opts).await?;
            report("applied", &applied);
        }
        Command::MigrateStatus => unreachable!("handled above"),
        Command::MigrateRollback(args) => {
            let rolled_back = migrations::rollback(&pool, &cli.path, args.step).await?;
            report("rolled back", &rolled_back);
        }
        Command::MigrateReset(args) => {
            if is_production && !args.force {
                anyhow::bail!("refusing destructive migrate:reset in production without --force");
            }
            let rolled_back = migrations::reset(&pool, &cli.path).await?;
            report("rolled back", &rolled_back);
        }
        Command::MigrateFresh(args) => {
            let applied =
                migrations::fresh(&pool, &cli.path, is_production, args.force, args.drop_views).await?;
            report("applied", &applied);
        }
        Command::MigrateRefresh(args) => {
            let applied = migrations::refresh(&pool, &cli.path, is_production, args.force).await?;
            report("applied", &applied);
        }
        Command::MigrateUp { file, pretend } => {
            let opts = UpOptions { step: false, pretend };
            let applied = migrations::up(&pool, &cli.path, &opts).await?;
            let matching: Vec<_> =
                applied.into_iter().filter(|name| name.starts_with(&format!("{file}_"))).collect();
            report("applied", &matching);
        }
        Command::MigrateDown { file } => {
            let steps = file.map(|_| 1);
            let rolled_back = migrations::rollback(&pool, &cli.path, steps).await?;
            report("rolled back", &rolled_back);
        }
    }

    Ok(())
}

async fn connect(database_override: &Option<String>) -> anyhow::Result<sqlx::MySqlPool> {
    let url = match database_override {
        Some(url) => url.clone(),
        None => ServerConfig::from_env()?.database.to_connection_string(),
    };
    let store = MetadataStore::connect(&url).await?;
    Ok(store.pool().clone())
}

fn report(verb: &str, names: &[String]) {
    if names.is_empty() {
        info!("no migrations {verb}");
        return;
    }
    for name in names {
        info!("{verb}: {name}");
    }
}

fn print_status(statuses: &[migrations::MigrationStatus]) {
    for status in statuses {
        match &status.applied {
            Some(applied) => println!("{}\tapplied\tbatch={}\t{}", status.name, applied.batch, applied.migrated_at),
            None => println!("{}\tpending", status.name),
        }
    }
}
