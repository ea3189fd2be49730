//! Connection setup for SeaOrmStore
//!
//! Every redirect is a short write transaction (`UPDATE` then `SELECT`), so
//! the pools are tuned for many brief writers. SQLite serializes writers on
//! the database lock; waiting writers queue on the busy timeout instead of
//! failing with `SQLITE_BUSY`.

use std::str::FromStr;
use std::time::Duration;

use sea_orm::sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use tracing::{debug, info};

use crate::errors::{Result, SnaplinkError};
use migration::{Migrator, MigratorTrait};

/// Pool limits derived from `database.pool_size` and the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    /// 获取连接的等待上限，SQLite 同时作为 busy_timeout
    pub acquire_timeout: Duration,
    /// `None` 表示连接永不因空闲被回收
    pub idle_timeout: Option<Duration>,
}

impl PoolSettings {
    pub fn new(database_url: &str, backend_name: &str, pool_size: u32) -> Self {
        let pool_size = pool_size.max(1);

        if backend_name == "sqlite" && is_sqlite_in_memory(database_url) {
            // 内存库随连接关闭而消失，只能用单个常驻连接
            return Self {
                max_connections: 1,
                min_connections: 1,
                acquire_timeout: Duration::from_secs(5),
                idle_timeout: None,
            };
        }

        if backend_name == "sqlite" {
            return Self {
                max_connections: pool_size,
                min_connections: 1,
                acquire_timeout: Duration::from_secs(5),
                idle_timeout: Some(Duration::from_secs(300)),
            };
        }

        Self {
            max_connections: pool_size,
            min_connections: pool_size.min(2),
            acquire_timeout: Duration::from_secs(8),
            idle_timeout: Some(Duration::from_secs(300)),
        }
    }
}

fn is_sqlite_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Open a pool for the given backend. Migrations are run separately.
pub async fn connect(
    database_url: &str,
    backend_name: &str,
    pool_size: u32,
) -> Result<DatabaseConnection> {
    let settings = PoolSettings::new(database_url, backend_name, pool_size);
    debug!(
        "Connecting to {} (max {} connections)",
        backend_name, settings.max_connections
    );

    if backend_name == "sqlite" {
        connect_sqlite(database_url, &settings).await
    } else {
        connect_server(database_url, backend_name, &settings).await
    }
}

async fn connect_sqlite(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<DatabaseConnection> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| SnaplinkError::database_config(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(settings.acquire_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .connect_with(options)
        .await
        .map_err(|e| {
            SnaplinkError::database_connection(format!("Cannot open link database: {}", e))
        })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

async fn connect_server(
    database_url: &str,
    backend_name: &str,
    settings: &PoolSettings,
) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .connect_timeout(settings.acquire_timeout)
        .acquire_timeout(settings.acquire_timeout)
        .sqlx_logging(false);
    if let Some(idle) = settings.idle_timeout {
        options.idle_timeout(idle);
    }

    Database::connect(options).await.map_err(|e| {
        SnaplinkError::database_connection(format!(
            "Cannot reach {} link database: {}",
            backend_name, e
        ))
    })
}

/// Bring the `short_links` schema up to date.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None).await.map_err(|e| {
        SnaplinkError::database_operation(format!("Link schema migration failed: {}", e))
    })?;

    info!("Link schema is up to date");
    Ok(())
}
