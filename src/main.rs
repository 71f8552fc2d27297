mod config;
mod create;
mod db;
mod editor;
mod error;
mod fields;
mod gateway;
mod list;
mod nav;
mod routes;
mod stats;
#[cfg(test)]
mod testing;
mod todo;
mod views;

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::EnvLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::db::SqliteGateway;
use crate::routes::AppState;

fn init_tracing(filter: Option<String>) {
    let filter = filter
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = EnvLoader::new().load().unwrap_or_default();
    let lookup = |key: &str| dotenv.get(key).cloned().or_else(|| std::env::var(key).ok());

    init_tracing(lookup("RUST_LOG"));
    let config = AppConfig::from_lookup(lookup)?;

    let pool = db::init_db(&config.database_url, config.acquire_timeout).await?;
    info!(database_url = %config.database_url, "database initialized");

    fs::create_dir_all("static")?;

    let bind_addr = config.bind_addr;
    let state = AppState::new(Arc::new(SqliteGateway::new(pool)), config);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(%bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
