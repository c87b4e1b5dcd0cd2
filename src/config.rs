use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::schedule::DEFAULT_UPCOMING_DAYS;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,

    // Logging
    pub log_dir: String,
    pub log_file: String,
    pub log_level: tracing::Level,

    /// Horizon for the "upcoming shifts" view.
    pub upcoming_days: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://roster.db".to_string(),
            log_dir: "logs".to_string(),
            log_file: "roster.log".to_string(),
            log_level: tracing::Level::INFO,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("ROSTER_DATABASE_URL").unwrap_or(defaults.database_url),
            log_dir: env::var("ROSTER_LOG_DIR").unwrap_or(defaults.log_dir),
            log_file: env::var("ROSTER_LOG_FILE").unwrap_or(defaults.log_file),
            log_level: parse_var("ROSTER_LOG_LEVEL", defaults.log_level)?,
            upcoming_days: parse_var("ROSTER_UPCOMING_DAYS", defaults.upcoming_days)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(name, env::var(name).ok(), default)
}

/// `raw` is the variable's value, `None` when unset.
fn parse_value<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
