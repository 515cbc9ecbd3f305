//! Configuration Management
//!
//! Settings come from command-line flags, falling back to environment
//! variables (a `.env` file is loaded by the binary before parsing).
//!
//! # Resolution
//! 1. Explicit flags (highest priority)
//! 2. Environment variables (`MYSQL_*`, `GENAI_*`, `GOOGLE_API_KEY`)
//! 3. Built-in defaults
//!
//! The API key has no default. Without it [`ConfigArgs::resolve`] fails and
//! the process stops before contacting the database or the model.

use std::fmt;
use std::time::Duration;

use clap::Args;

use crate::completion::{RetryPolicy, DEFAULT_MODEL};
use crate::engine::ConnectionConfig;
use crate::error::{AskSqlError, Result};
use crate::executor::DEFAULT_MAX_DISPLAY_ROWS;

/// Raw settings as parsed from flags and environment
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// MySQL host
    #[arg(long, env = "MYSQL_HOST", default_value = "localhost")]
    pub host: String,

    /// MySQL port
    #[arg(long, env = "MYSQL_PORT", default_value_t = 3306)]
    pub port: u16,

    /// MySQL user
    #[arg(long, env = "MYSQL_USER", default_value = "root")]
    pub user: String,

    /// MySQL password
    #[arg(long, env = "MYSQL_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Database to query
    #[arg(long, env = "MYSQL_DATABASE", default_value = "test")]
    pub database: String,

    /// Generation model identifier
    #[arg(long, env = "GENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API key for the generation backend
    #[arg(long = "api-key", env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Completion attempts per question, including the first
    #[arg(long, env = "GENAI_RETRIES", default_value_t = 3)]
    pub retries: u32,

    /// Seconds to wait between completion attempts
    #[arg(long, env = "GENAI_RETRY_DELAY_SECS", default_value_t = 2)]
    pub retry_delay_secs: u64,

    /// Per-request timeout for the generation backend, in seconds
    #[arg(long, env = "GENAI_TIMEOUT_SECS", default_value_t = 120)]
    pub generation_timeout_secs: u64,

    /// Optional query timeout, in milliseconds
    #[arg(long, env = "MYSQL_QUERY_TIMEOUT_MS")]
    pub query_timeout_ms: Option<u64>,

    /// Result rows shown before truncating
    #[arg(long = "max-rows", env = "ASKSQL_MAX_ROWS", default_value_t = DEFAULT_MAX_DISPLAY_ROWS)]
    pub max_display_rows: usize,
}

/// Validated settings for one process run
#[derive(Clone)]
pub struct Settings {
    pub connection: ConnectionConfig,
    pub model: String,
    pub api_key: String,
    pub retry: RetryPolicy,
    pub generation_timeout: Duration,
    pub query_timeout: Option<Duration>,
    pub max_display_rows: usize,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("connection", &self.connection)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("retry", &self.retry)
            .field("generation_timeout", &self.generation_timeout)
            .field("query_timeout", &self.query_timeout)
            .field("max_display_rows", &self.max_display_rows)
            .finish()
    }
}

impl ConfigArgs {
    /// Check presence and ranges, producing usable settings
    pub fn resolve(self) -> Result<Settings> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AskSqlError::config_error("Missing GOOGLE_API_KEY"))?;

        if self.retries == 0 {
            return Err(AskSqlError::invalid_input("retries must be at least 1"));
        }

        if self.max_display_rows == 0 {
            return Err(AskSqlError::invalid_input("max-rows must be at least 1"));
        }

        if self.model.trim().is_empty() {
            return Err(AskSqlError::config_error("Missing GENAI_MODEL"));
        }

        Ok(Settings {
            connection: ConnectionConfig::mysql(
                self.host,
                self.port,
                self.user,
                self.password,
                self.database,
            ),
            model: self.model,
            api_key,
            retry: RetryPolicy {
                max_attempts: self.retries,
                delay: Duration::from_secs(self.retry_delay_secs),
            },
            generation_timeout: Duration::from_secs(self.generation_timeout_secs),
            query_timeout: self.query_timeout_ms.map(Duration::from_millis),
            max_display_rows: self.max_display_rows,
        })
    }
}
