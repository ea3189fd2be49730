//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::warn;

use super::{LinkRecord, LinkStore};
use crate::errors::{Result, SnaplinkError};

pub use connection::{PoolSettings, connect, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(SnaplinkError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend.to_ascii_lowercase().as_str() {
        "mariadb" => "mysql".to_string(),
        "postgresql" => "postgres".to_string(),
        other => other.to_string(),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStore {
    pub async fn new(database_url: &str, backend_name: &str, pool_size: u32) -> Result<Self> {
        if database_url.is_empty() {
            return Err(SnaplinkError::database_config("database_url is empty"));
        }

        let backend_name = normalize_backend_name(backend_name);

        let db = connect(database_url, &backend_name, pool_size).await?;
        run_migrations(&db).await?;

        warn!("{} Storage initialized.", backend_name.to_uppercase());
        Ok(Self { db, backend_name })
    }
}

#[async_trait]
impl LinkStore for SeaOrmStore {
    async fn insert(&self, code: &str, destination: &str) -> Result<LinkRecord> {
        self.insert_new(code, destination).await
    }

    async fn get(&self, code: &str) -> Result<LinkRecord> {
        self.find(code).await
    }

    async fn resolve_and_increment(&self, code: &str) -> Result<LinkRecord> {
        self.increment_and_fetch(code).await
    }

    async fn update(&self, code: &str, destination: &str) -> Result<LinkRecord> {
        self.replace_destination(code, destination).await
    }

    async fn delete(&self, code: &str) -> Result<()> {
        self.remove(code).await
    }

    async fn count(&self) -> Result<u64> {
        self.count_links().await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("data/links.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mysql://u:p@localhost/db").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://u:p@localhost/db").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://u:p@localhost/db").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("redis://localhost").is_err());
    }

    #[test]
    fn test_normalize_backend_name() {
        assert_eq!(normalize_backend_name("mariadb"), "mysql");
        assert_eq!(normalize_backend_name("PostgreSQL"), "postgres");
        assert_eq!(normalize_backend_name("sqlite"), "sqlite");
    }
}
