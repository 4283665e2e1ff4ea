//! Server configuration read from environment variables.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use trivia_core::provider::{Difficulty, FetchOptions};
use trivia_opentdb::OpenTdbConfig;
use trivia_opentdb::client::DEFAULT_BASE_URL;
use trivia_quiz::application::question_source::DEFAULT_MAX_FETCH_ATTEMPTS;

use crate::error::AppError;

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    /// `DATABASE_URL`: PostgreSQL connection string.
    pub database_url: String,
    /// `HOST`: interface to bind.
    pub host: String,
    /// `PORT`: port to bind.
    pub port: u16,
    /// `DB_MAX_CONNECTIONS`: pool size.
    pub db_max_connections: u32,
    /// `DB_ACQUIRE_TIMEOUT_SECS`: how long a query waits for a connection.
    pub db_acquire_timeout: Duration,
    /// `TRIVIA_API_URL` and `TRIVIA_TIMEOUT_SECS`.
    pub question_bank: OpenTdbConfig,
    /// `TRIVIA_CATEGORY` and `TRIVIA_DIFFICULTY`.
    pub fetch_options: FetchOptions,
    /// `TRIVIA_MAX_FETCH_ATTEMPTS`: provider fetches before giving up on
    /// already-seen questions.
    pub max_fetch_attempts: u32,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_owned()))?;

        let difficulty = optional::<Difficulty>(&lookup, "TRIVIA_DIFFICULTY")?;
        let category = optional::<u32>(&lookup, "TRIVIA_CATEGORY")?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parsed(&lookup, "PORT", 3000)?,
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout: Duration::from_secs(parsed(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?),
            question_bank: OpenTdbConfig {
                base_url: lookup("TRIVIA_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
                timeout: Duration::from_secs(parsed(&lookup, "TRIVIA_TIMEOUT_SECS", 10)?),
            },
            fetch_options: FetchOptions {
                category,
                difficulty,
            },
            max_fetch_attempts: parsed(
                &lookup,
                "TRIVIA_MAX_FETCH_ATTEMPTS",
                DEFAULT_MAX_FETCH_ATTEMPTS,
            )?,
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| AppError::Config(format!("{key} is invalid: {e}")))
        })
        .transpose()
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(optional(lookup, key)?.unwrap_or(default))
}
