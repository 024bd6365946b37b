use thiserror::Error;

use crate::env::{get_env_var, get_env_var_opt};

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// A variable was set but its value could not be parsed.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// The variable name.
        name: String,
        /// The offending value.
        value: String,
    },
}

/// Console configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// SQLite database path (`DATABASE_URL`).
    pub database_url: String,
    /// Rows per page for paged listings (`COURTDB_PAGE_SIZE`, default 20).
    pub page_size: i64,
}

impl ConsoleConfig {
    /// Loads the configuration. `DATABASE_URL` is required; everything
    /// else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            get_env_var("DATABASE_URL").map_err(|e| ConfigError::MissingEnvVar(e.0))?;

        let page_size = match get_env_var_opt("COURTDB_PAGE_SIZE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "COURTDB_PAGE_SIZE".to_string(),
                value: raw,
            })?,
            None => 20,
        };

        Ok(Self {
            database_url,
            page_size,
        })
    }
}
