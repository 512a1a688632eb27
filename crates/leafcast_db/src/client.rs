//! Database client for Leafcast
//!
//! This module provides the pooled database client the repositories run on.
//! The SQL dialect is chosen at compile time through the `sqlite` (default)
//! and `postgres` features; [`Db`] names the selected driver.

use crate::error::DbError;
use leafcast_config::{AppConfig, DatabaseConfig};
use sqlx::pool::PoolOptions;
use sqlx::Pool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("leafcast-db needs either the `sqlite` or the `postgres` feature");

/// The database driver selected at compile time
#[cfg(feature = "postgres")]
pub type Db = sqlx::Postgres;

/// The database driver selected at compile time
#[cfg(not(feature = "postgres"))]
pub type Db = sqlx::Sqlite;

/// Connection pool of the selected driver
pub type DbPool = Pool<Db>;

/// Result row of the selected driver
pub type DbRow = <Db as sqlx::Database>::Row;

#[cfg(feature = "postgres")]
type DbConnectOptions = sqlx::postgres::PgConnectOptions;

#[cfg(not(feature = "postgres"))]
type DbConnectOptions = sqlx::sqlite::SqliteConnectOptions;

/// Database client for Leafcast
///
/// Cloning the client is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DbClient {
    /// The database connection pool
    pool: DbPool,
}

impl DbClient {
    /// Create a new database client
    ///
    /// # Arguments
    ///
    /// * `config` - The application configuration
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database configuration is missing
    /// * The database URL is missing
    /// * The database connection fails
    pub async fn new(config: &Arc<AppConfig>) -> Result<Self, DbError> {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        Self::from_config(db_config).await
    }

    /// Create a new database client from a database configuration
    ///
    /// Pool size and timeouts are taken from the configuration.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database URL is empty or invalid
    /// * The database connection fails
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }

        let pool_options = PoolOptions::<Db>::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(db_config.idle_timeout_secs));

        let pool = Self::create_pool(&db_config.url, pool_options).await?;
        Ok(Self { pool })
    }

    /// Create a new database client from a database URL with default pool settings
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database URL is empty or invalid
    /// * The database connection fails
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::UrlError("Database URL is empty".to_string()));
        }

        Self::from_config(&DatabaseConfig::with_url(db_url)).await
    }

    /// Create a connection pool
    async fn create_pool(db_url: &str, pool_options: PoolOptions<Db>) -> Result<DbPool, DbError> {
        debug!("Creating database pool for {}", redacted_url(db_url));

        let connect_options = Self::connect_options(db_url)?;

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                DbError::PoolError(e.to_string())
            })?;

        info!("Database pool created successfully");
        Ok(pool)
    }

    #[cfg(not(feature = "postgres"))]
    fn connect_options(db_url: &str) -> Result<DbConnectOptions, DbError> {
        ensure_sqlite_dir(db_url)?;

        let options = DbConnectOptions::from_str(db_url)
            .map_err(|e| DbError::UrlError(e.to_string()))?
            .create_if_missing(true);
        Ok(options)
    }

    #[cfg(feature = "postgres")]
    fn connect_options(db_url: &str) -> Result<DbConnectOptions, DbError> {
        DbConnectOptions::from_str(db_url).map_err(|e| DbError::UrlError(e.to_string()))
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Execute a statement that returns no rows
    ///
    /// # Returns
    ///
    /// The number of rows affected
    pub async fn execute(&self, query: &str) -> Result<u64, DbError> {
        let result = sqlx::query(query).execute(&self.pool).await.map_err(|e| {
            error!("Failed to execute statement: {}", e);
            DbError::from(e)
        })?;
        Ok(result.rows_affected())
    }

    /// Check if the database is healthy by executing a simple query
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl std::fmt::Display for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbClient")
    }
}

/// Scheme and host of a database URL, without credentials, path or query
fn redacted_url(db_url: &str) -> String {
    match Url::parse(db_url) {
        Ok(url) => match url.host_str() {
            Some(host) => format!("{}://{}", url.scheme(), host),
            None => format!("{}:", url.scheme()),
        },
        Err(_) => "<unparseable url>".to_string(),
    }
}

/// Create the directory of a file-backed SQLite database if it doesn't exist.
///
/// Handles both "sqlite:example.db" and "sqlite://example.db"; in-memory
/// databases are left alone.
#[cfg(not(feature = "postgres"))]
fn ensure_sqlite_dir(db_url: &str) -> Result<(), DbError> {
    let db_path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
        .unwrap_or(db_url);
    let db_path = db_path.split('?').next().unwrap_or(db_path);

    if db_path.is_empty() || db_path.contains(":memory:") {
        return Ok(());
    }

    if let Some(dir) = std::path::Path::new(db_path).parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("Creating directory for SQLite database: {:?}", dir);
            std::fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory for SQLite database: {}", e);
                DbError::PoolError(format!("Failed to create directory: {}", e))
            })?;
        }
    }

    Ok(())
}
