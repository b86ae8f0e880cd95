use anyhow::{anyhow, Context, Result};

use crate::charts::score::ScoreStrategy;

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values; every variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the service runs against the in-memory sample dataset.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub score_strategy: ScoreStrategy,
    pub default_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            score_strategy: match std::env::var("SCORE_STRATEGY") {
                Ok(raw) => raw.parse::<ScoreStrategy>().map_err(|e| anyhow!(e))?,
                Err(_) => ScoreStrategy::Raw,
            },
            default_limit: parse_env("DEFAULT_LIMIT", 25)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
