// src/config.rs
use anyhow::{Context, Result};
use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub cache_ttl: Duration,
    pub yahoo_base_url: String,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment. Call `dotenv().ok()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let ttl_secs = parse_or(&lookup, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let timeout_secs = parse_or(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        let yahoo_base_url = lookup("YAHOO_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.yahoo_base_url);

        Ok(AppConfig {
            port,
            cache_ttl: Duration::from_secs(ttl_secs),
            yahoo_base_url,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr + std::fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        None => {
            warn!("${} not set, defaulting to {}", name, default);
            Ok(default)
        }
    }
}
