//! Seed binary for populating the todo database.
//!
//! Usage: cargo run --bin seed
//!        cargo run --bin seed -- --file demo.toml
//!
//! Reads `[[todos]]` entries from a TOML file and inserts them through the
//! same gateway the server uses.

mod config;
mod db;
mod error;
mod gateway;
mod todo;

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use dotenvy::EnvLoader;
use serde::Deserialize;
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::db::SqliteGateway;
use crate::gateway::TodoGateway;
use crate::todo::{parse_date, NewTodo, Priority, Status};

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Insert todos from a TOML file")]
struct Args {
    /// Seed file to read
    #[arg(long, default_value = "seed.toml")]
    file: String,

    /// Database URL (overrides DATABASE_URL from .env)
    #[arg(long)]
    db: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeedData {
    #[serde(default)]
    todos: Vec<SeedTodo>,
}

#[derive(Debug, Deserialize)]
struct SeedTodo {
    task: String,
    #[serde(default)]
    detail: Option<String>,
    /// Absolute date, `YYYY-MM-DD`.
    #[serde(default)]
    due_date: Option<String>,
    /// Days relative to today; negative values are in the past.
    #[serde(default)]
    due_in_days: Option<i64>,
    priority: String,
    #[serde(default)]
    status: Option<String>,
}

impl SeedTodo {
    fn to_new_todo(&self, today: NaiveDate) -> Result<NewTodo> {
        let due_date = match (&self.due_date, self.due_in_days) {
            (Some(raw), _) => match parse_date(raw) {
                Some(date) => date,
                None => bail!("invalid due_date '{}' for '{}'", raw, self.task),
            },
            (None, Some(days)) => today + Duration::days(days),
            (None, None) => today,
        };

        let priority = self.priority.trim().parse::<Priority>()?;
        let status = match &self.status {
            Some(raw) => raw.trim().parse::<Status>()?,
            None => Status::default(),
        };

        Ok(NewTodo {
            task: self.task.clone(),
            detail: self.detail.clone().filter(|d| !d.trim().is_empty()),
            due_date,
            priority: Some(priority),
            status,
        })
    }
}

fn parse_seed(content: &str) -> Result<SeedData> {
    toml::from_str(content).context("failed to parse seed file")
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

    let mut config = AppConfig::from_lookup(lookup)?;
    if let Some(url) = args.db {
        config.database_url = url;
    }

    let pool = db::init_db(&config.database_url, config.acquire_timeout).await?;
    info!(database_url = %config.database_url, "connected to database");
    let gateway = SqliteGateway::new(pool);

    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file))?;
    let seed_data = parse_seed(&content)?;
    info!(count = seed_data.todos.len(), file = %args.file, "seeding todos");

    let today = config.today();
    let mut created = 0;
    for seed_todo in &seed_data.todos {
        let new_todo = match seed_todo.to_new_todo(today) {
            Ok(new_todo) => new_todo,
            Err(err) => {
                warn!(task = %seed_todo.task, error = %err, "skipping seed entry");
                continue;
            }
        };
        match gateway.insert_todo(&new_todo).await {
            Ok(todo) => {
                info!(id = %todo.id, task = %todo.task, "created todo");
                created += 1;
            }
            Err(err) => warn!(task = %seed_todo.task, error = %err, "failed to create todo"),
        }
    }

    info!(created, "seeding complete");
    Ok(())
}
