// src/config.rs

use std::{env, fmt, net::SocketAddr, str::FromStr};

use dotenvy::dotenv;

/// Error raised when the environment does not describe a runnable service.
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has invalid value '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs the service on the in-process store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub log_dir: String,
    pub bind_addr: SocketAddr,
    /// Seed the sample quiz for courses that have none.
    pub seed_sample_quiz: bool,
    /// Seconds an unfinished, untimed attempt may sit unused before it is dropped.
    pub attempt_idle_ttl_secs: u64,
    /// Seconds a completed attempt is kept after its last use.
    pub attempt_completed_grace_secs: u64,
}

/// Reads `key`, falling back to `default` when unset.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let bind_addr = parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;
        let seed_sample_quiz = parse_or("QUIZ_SEED_SAMPLE", true)?;
        let attempt_idle_ttl_secs = parse_or("ATTEMPT_IDLE_TTL_SECS", 2 * 60 * 60)?;
        let attempt_completed_grace_secs = parse_or("ATTEMPT_COMPLETED_GRACE_SECS", 15 * 60)?;

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            log_dir,
            bind_addr,
            seed_sample_quiz,
            attempt_idle_ttl_secs,
            attempt_completed_grace_secs,
        })
    }
}
