//! Backup binary for copying the todo database to a backup file.
//!
//! Usage: cargo run --bin backup
//!        cargo run --bin backup -- --target my_backup.db
//!        cargo run --bin backup -- --db sqlite:other.db --target backup.db
//!
//! Copies every row of the todo table into a new database file.

mod config;
mod db;
mod error;
mod gateway;
mod todo;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use dotenvy::EnvLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::db::DbPool;

#[derive(Parser, Debug)]
#[command(name = "backup")]
#[command(about = "Backup the todo database to a new file")]
struct Args {
    /// Source database URL (overrides DATABASE_URL from .env)
    #[arg(long)]
    db: Option<String>,

    /// Target backup file path (default: backup_{year}_{month}_{day}.db)
    #[arg(long)]
    target: Option<String>,
}

type TodoRow = (i64, String, Option<String>, String, String, String);

/// Copies the todo table, preserving ids. Returns the number of rows copied.
async fn copy_todos(source: &DbPool, target: &DbPool) -> Result<usize> {
    let rows: Vec<TodoRow> =
        sqlx::query_as("SELECT id, task, detail, due_date, priority, status FROM todo ORDER BY id")
            .fetch_all(source)
            .await
            .context("failed to read source todos")?;

    let mut tx = target.begin().await?;
    for row in &rows {
        sqlx::query(
            "INSERT INTO todo (id, task, detail, due_date, priority, status) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(row.0)
        .bind(&row.1)
        .bind(&row.2)
        .bind(&row.3)
        .bind(&row.4)
        .bind(&row.5)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to copy todo {}", row.0))?;
    }
    tx.commit().await?;

    Ok(rows.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let dotenv = EnvLoader::new().load().unwrap_or_default();
    let lookup = |key: &str| dotenv.get(key).cloned().or_else(|| std::env::var(key).ok());

    let filter = lookup("RUST_LOG")
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_lookup(lookup)?;
    let source_url = args.db.unwrap_or_else(|| config.database_url.clone());

    let now = chrono::Utc::now();
    let default_target = format!("backup_{}_{:02}_{:02}.db", now.year(), now.month(), now.day());
    let target_file = args.target.unwrap_or(default_target);
    let target_url = format!("sqlite:{}?mode=rwc", target_file);

    info!(source = %source_url, target = %target_file, "starting backup");

    let source_pool = db::init_db(&source_url, config.acquire_timeout).await?;
    // init_db creates the table in the fresh target file.
    let target_pool = db::init_db(&target_url, config.acquire_timeout).await?;

    let copied = copy_todos(&source_pool, &target_pool).await?;
    info!(copied, target = %target_file, "backup complete");

    Ok(())
}
