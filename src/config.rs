use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:todo.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn css_class(self) -> &'static str {
        match self {
            Theme::Dark => "theme-dark",
            Theme::Light => "theme-light",
        }
    }
}

/// Settings handed to the server at construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub timezone: Tz,
    pub theme: Theme,
    pub acquire_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            timezone: chrono_tz::UTC,
            theme: Theme::Dark,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Builds the config from a key lookup (a `.env` map falling back to the
    /// process environment).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid BIND_ADDR '{}'", bind_raw))?;

        let timezone = lookup("APP_TIMEZONE")
            .map(|raw| parse_timezone(&raw))
            .unwrap_or(chrono_tz::UTC);

        let theme = lookup("APP_THEME")
            .map(|raw| parse_theme(&raw))
            .unwrap_or_default();

        let acquire_timeout = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid DB_ACQUIRE_TIMEOUT_SECS '{}'", raw))?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        };

        Ok(Self {
            database_url,
            bind_addr,
            timezone,
            theme,
            acquire_timeout,
        })
    }

    /// Current calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

fn parse_timezone(raw: &str) -> Tz {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(timezone = raw, "invalid timezone, falling back to UTC");
        chrono_tz::UTC
    })
}

fn parse_theme(raw: &str) -> Theme {
    match raw.trim().to_ascii_lowercase().as_str() {
        "dark" => Theme::Dark,
        "light" => Theme::Light,
        _ => {
            warn!(theme = raw, "unknown theme, falling back to dark");
            Theme::Dark
        }
    }
}
