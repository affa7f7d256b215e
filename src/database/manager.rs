use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("{0}")]
    UniqueViolation(String),

    #[error("{0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Translate constraint failures into domain errors, keeping the rest as-is.
    ///
    /// `conflict` is the message used for unique-key violations.
    pub fn classify(err: sqlx::Error, conflict: impl FnOnce() -> String) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => return DatabaseError::UniqueViolation(conflict()),
                Some(code) => {
                    if let Some(message) = violation_message(code) {
                        tracing::debug!("Constraint violation {}: {}", code, db_err.message());
                        return DatabaseError::ConstraintViolation(message.to_string());
                    }
                }
                None => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Client-facing text for SQLSTATEs caused by bad input
fn violation_message(code: &str) -> Option<&'static str> {
    match code {
        // foreign_key_violation
        "23503" => Some("Referenced record does not exist"),
        // not_null_violation
        "23502" => Some("Missing required value"),
        // check_violation
        "23514" => Some("Value is out of range"),
        // string_data_right_truncation
        "22001" => Some("Value is too long"),
        _ => None,
    }
}

/// Connection pool setup for the application database
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the pool described by `config`. Fails fast on a bad URL.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::pool_options(config);
        let url = Self::connection_string(config)?;
        let pool = options.connect(&url).await?;
        info!("Connected to database at {}", Self::redacted(&url));
        Ok(pool)
    }

    /// Like [`connect`](Self::connect) but defers the first connection until a query runs.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = Self::connection_string(config)?;
        Ok(Self::pool_options(config).connect_lazy(&url)?)
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    fn connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        let base = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(url.into())
    }

    /// Strip credentials before a URL reaches the logs
    fn redacted(connection_string: &str) -> String {
        match url::Url::parse(connection_string) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
