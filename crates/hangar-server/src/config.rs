//! Server configuration from environment.
//!
//! Read once at startup and threaded through `AppState`; nothing in the
//! request path touches the environment.

use anyhow::{bail, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// PostgreSQL connection string. Absent selects the embedded SQLite file.
    pub database_url: Option<String>,
    /// SQLite fallback path, used only when `database_url` is not set.
    pub sqlite_path: String,
    /// Session-signing secret. Startup fails in production when unset.
    pub secret_key: String,
    pub database_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        let production = database_url.is_some()
            || env::var("APP_ENV").map(|v| v == "production").unwrap_or(false);

        let secret_key = match env::var("SECRET_KEY").ok().filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if production => bail!("SECRET_KEY environment variable must be set in production"),
            None => {
                tracing::warn!("SECRET_KEY not set, using a development-only default");
                "dev-secret-key-change-in-production".to_string()
            }
        };

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            database_url,
            sqlite_path: env::var("HANGAR_DB_PATH").unwrap_or_else(|_| "hangar.db".to_string()),
            secret_key,
            database_max_connections: env::var("HANGAR_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        })
    }
}
