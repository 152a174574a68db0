// src/config.rs

use crate::error::{Error, Result};
use std::{env, time::Duration};
use url::Url;

pub const DEFAULT_FILMS_URL: &str = "https://en.wikipedia.org/wiki/List_of_highest-grossing_films";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Service settings, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub log_level: String,
    pub fetch_timeout: Duration,
    pub films_url: Url,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            films_url: Url::parse(DEFAULT_FILMS_URL).expect("default films URL should parse"),
        }
    }
}

impl ServiceConfig {
    /// `PORT`, `LOG_LEVEL`, `FETCH_TIMEOUT_SECS`, `FILMS_SOURCE_URL`; unset keys fall back
    /// to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(port) = lookup("PORT") {
            cfg.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got {port:?}")))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            cfg.log_level = level;
        }
        if let Some(secs) = lookup("FETCH_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("FETCH_TIMEOUT_SECS must be whole seconds, got {secs:?}"))
            })?;
            cfg.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("FILMS_SOURCE_URL") {
            cfg.films_url = Url::parse(&raw)
                .map_err(|e| Error::Config(format!("FILMS_SOURCE_URL {raw:?}: {e}")))?;
        }

        Ok(cfg)
    }
}
