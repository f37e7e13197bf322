//! Database connection, dialect selection and schema initialization.
//!
//! Both backends are reached through `sqlx::Any`: the CRUD SQL is written
//! once with `$n` placeholders and `INSERT ... RETURNING id`, which SQLite
//! and PostgreSQL both accept. The dialect only decides which DDL file runs
//! and whether the SQLite foreign-key pragma is needed.

use std::sync::Once;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use hangar_core::Error;
use sqlx::any::{install_default_drivers, AnyArguments, AnyPoolOptions};
use sqlx::AnyPool;
use tracing::info;

use crate::config::Config;

const SQLITE_SCHEMA: &str = include_str!("../../migrations/sqlite.sql");
const POSTGRES_SCHEMA: &str = include_str!("../../migrations/postgres.sql");

static DRIVERS: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    pub fn is_postgres(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    fn schema(self) -> &'static str {
        match self {
            Dialect::Sqlite => SQLITE_SCHEMA,
            Dialect::Postgres => POSTGRES_SCHEMA,
        }
    }
}

/// Database connection wrapper.
#[derive(Clone)]
pub struct Db {
    pool: AnyPool,
    dialect: Dialect,
}

impl Db {
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Connect per the configuration and idempotently create the schema.
    ///
    /// `DATABASE_URL` selects PostgreSQL; without it the embedded SQLite
    /// file is used and the fallback is logged.
    pub async fn connect(config: &Config) -> Result<Db> {
        let (url, dialect) = connection_target(config);
        if dialect == Dialect::Sqlite {
            info!(
                path = %config.sqlite_path,
                "DATABASE_URL not set, falling back to embedded SQLite"
            );
        }
        Self::connect_url(&url, dialect, config.database_max_connections).await
    }

    pub async fn connect_url(url: &str, dialect: Dialect, max_connections: u32) -> Result<Db> {
        DRIVERS.call_once(install_default_drivers);

        let mut options = AnyPoolOptions::new().max_connections(max_connections);
        if dialect == Dialect::Sqlite {
            // Declared ON DELETE rules are inert until SQLite enforces them.
            options = options.after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON").execute(conn).await?;
                    Ok(())
                })
            });
        }

        let pool = options.connect(url).await?;
        let db = Db { pool, dialect };
        db.initialize_schema().await?;

        info!("Database schema ready");
        Ok(db)
    }

    /// Create all tables and indexes if absent. Safe to run repeatedly.
    ///
    /// Comment lines are stripped from the whole file before the text is
    /// split into statements, so a semicolon inside a comment never ends up
    /// executed as SQL.
    async fn initialize_schema(&self) -> Result<()> {
        let ddl: String = self
            .dialect
            .schema()
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        for statement in ddl.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Decide which backend a configuration selects, without connecting.
fn connection_target(config: &Config) -> (String, Dialect) {
    match &config.database_url {
        Some(url) => (url.clone(), Dialect::Postgres),
        None => (
            format!("sqlite:{}?mode=rwc", config.sqlite_path),
            Dialect::Sqlite,
        ),
    }
}

/// Application-assigned row timestamp (RFC 3339, UTC).
///
/// The subsecond fraction is fixed-width so the stored strings order
/// lexicographically the same way the instants do.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Translate a sqlx error, turning a uniqueness violation into `Duplicate`
/// with an entity-specific message.
pub fn constraint_error(err: sqlx::Error, duplicate: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Duplicate(duplicate.to_string())
        }
        _ => internal(err),
    }
}

/// Any other database failure. The detail is logged at the API boundary;
/// callers get a generic body.
pub fn internal(err: sqlx::Error) -> Error {
    Error::Internal(err.to_string())
}

/// A bind argument for dynamically assembled UPDATE statements. The SET
/// fragments are compile-time constants; only values travel through here.
pub enum Arg {
    Int(Option<i64>),
    Text(Option<String>),
}

/// Bind a value list onto a query in order.
pub fn bind_args(
    sql: &str,
    args: Vec<Arg>,
) -> sqlx::query::Query<'_, sqlx::Any, AnyArguments<'_>> {
    let mut query = sqlx::query(sql);
    for arg in args {
        query = match arg {
            Arg::Int(v) => query.bind(v),
            Arg::Text(v) => query.bind(v),
        };
    }
    query
}
