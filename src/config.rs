// src/config.rs

use std::{env, fmt};
use dotenvy::dotenv;

use crate::discussion::tree::DEFAULT_MAX_REPLY_DEPTH;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    /// Comments at this depth or deeper are shown but cannot be replied to.
    pub max_reply_depth: usize,
    pub port: u16,
}

/// Startup configuration problems, reported before the server binds.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "{} has an invalid value: {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let max_reply_depth = parse_value(
            "MAX_REPLY_DEPTH",
            env::var("MAX_REPLY_DEPTH").ok(),
            DEFAULT_MAX_REPLY_DEPTH,
        )?;
        let port = parse_value("PORT", env::var("PORT").ok(), 3000)?;

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            max_reply_depth,
            port,
        })
    }
}

fn parse_value<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
