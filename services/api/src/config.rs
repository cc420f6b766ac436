//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::Level;

/// One week.
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;
/// Ten years.
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which family of adapters backs sentiment analysis and insight generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiBackend {
    /// OpenAI chat completions.
    OpenAi,
    /// Local stand-ins that need no network access.
    Offline,
}

impl FromStr for AiBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(AiBackend::OpenAi),
            "offline" | "mock" => Ok(AiBackend::Offline),
            other => Err(format!("'{}' is not one of openai, offline", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub ai_backend: AiBackend,
    pub openai_api_key: Option<String>,
    pub insights_model: String,
    pub sentiment_model: String,
    pub sentiment_concurrency: usize,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub cors_origin: HeaderValue,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server and Database Settings ---
        let bind_address = parse_var("BIND_ADDRESS", &var_or("BIND_ADDRESS", "0.0.0.0:3000"))?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- AI Settings ---
        let ai_backend = var_or("AI_BACKEND", "openai")
            .parse::<AiBackend>()
            .map_err(|e| ConfigError::InvalidValue("AI_BACKEND".to_string(), e))?;
        let openai_api_key = lookup("OPENAI_API_KEY");
        if ai_backend == AiBackend::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY".to_string()));
        }
        let insights_model = var_or("INSIGHTS_MODEL", "gpt-4o-mini");
        let sentiment_model = var_or("SENTIMENT_MODEL", "gpt-4o-mini");
        let sentiment_concurrency: usize =
            parse_var("SENTIMENT_CONCURRENCY", &var_or("SENTIMENT_CONCURRENCY", "4"))?;
        if sentiment_concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "SENTIMENT_CONCURRENCY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // --- Auth Settings ---
        let access_token_ttl_minutes = parse_in_range(
            "ACCESS_TOKEN_TTL_MINUTES",
            &var_or("ACCESS_TOKEN_TTL_MINUTES", "60"),
            1..=MAX_ACCESS_TOKEN_TTL_MINUTES,
        )?;
        let refresh_token_ttl_days = parse_in_range(
            "REFRESH_TOKEN_TTL_DAYS",
            &var_or("REFRESH_TOKEN_TTL_DAYS", "30"),
            1..=MAX_REFRESH_TOKEN_TTL_DAYS,
        )?;

        let cors_origin = parse_var("CORS_ORIGIN", &var_or("CORS_ORIGIN", "http://localhost:3000"))?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            ai_backend,
            openai_api_key,
            insights_model,
            sentiment_model,
            sentiment_concurrency,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            cors_origin,
        })
    }
}

fn parse_in_range(key: &str, raw: &str, range: RangeInclusive<i64>) -> Result<i64, ConfigError> {
    let value: i64 = parse_var(key, raw)?;
    if !range.contains(&value) {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("{} is outside {}..={}", value, range.start(), range.end()),
        ));
    }
    Ok(value)
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
