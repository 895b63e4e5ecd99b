//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which remote service answers summarization prompts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionBackend {
    /// OpenAI chat completions.
    OpenAi { api_key: String, model: String },
    /// A plain HTTP endpoint accepting `{ "prompt", "response_type" }`.
    Http {
        endpoint_url: String,
        api_key: Option<String>,
    },
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
    pub session_ttl_days: i64,
    pub completion: CompletionBackend,
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

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        let max_upload_bytes = parse_or("MAX_UPLOAD_BYTES", &lookup, 10 * 1024 * 1024)?;
        let session_ttl_days = parse_or("SESSION_TTL_DAYS", &lookup, 30)?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be a positive number of days".to_string(),
            ));
        }

        // --- Completion Backend ---
        let backend = lookup("COMPLETION_BACKEND").unwrap_or_else(|| "openai".to_string());
        let completion = match backend.to_lowercase().as_str() {
            "openai" => CompletionBackend::OpenAi {
                api_key: lookup("OPENAI_API_KEY")
                    .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?,
                model: lookup("SUMMARY_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            },
            "http" => CompletionBackend::Http {
                endpoint_url: lookup("COMPLETION_ENDPOINT_URL").ok_or_else(|| {
                    ConfigError::MissingVar("COMPLETION_ENDPOINT_URL".to_string())
                })?,
                api_key: lookup("COMPLETION_API_KEY"),
            },
            other => {
                return Err(ConfigError::InvalidValue(
                    "COMPLETION_BACKEND".to_string(),
                    format!("'{}' is not one of 'openai' or 'http'", other),
                ))
            }
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            max_upload_bytes,
            session_ttl_days,
            completion,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
