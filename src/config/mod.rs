use dotenvy::dotenv;
use serde::Deserialize;

use crate::error::Result;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub database_acquire_timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Settings needed to open the connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Build a configuration from explicit key/value pairs instead of the process environment.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Config>(pairs)?)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            acquire_timeout_secs: self.database_acquire_timeout_secs,
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
        }
    }
}

/// Initialize environment variables and load configuration
///
/// A `database_url` given here takes precedence over `DATABASE_URL`.
pub fn init(database_url: Option<String>) -> Result<Config> {
    let Some(url) = database_url else {
        return Config::load();
    };

    dotenv().ok();

    let vars = std::env::vars()
        .filter(|(key, _)| !key.eq_ignore_ascii_case("DATABASE_URL"))
        .chain(std::iter::once(("DATABASE_URL".to_string(), url)));

    Config::from_pairs(vars)
}
