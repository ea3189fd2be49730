//! Link storage
//!
//! [`LinkStore`] is the only authority over link records and their click
//! counters. Every operation on one code is linearizable with respect to the
//! other operations on that code; operations on different codes never share
//! a lock.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStore;
pub use memory::MemoryStore;
pub use models::LinkRecord;

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Insert a new record; `AlreadyExists` if `code` is live.
    async fn insert(&self, code: &str, destination: &str) -> Result<LinkRecord>;

    /// Plain read; `NotFound` if `code` is not live.
    async fn get(&self, code: &str) -> Result<LinkRecord>;

    /// Read the destination and count one click in a single step.
    ///
    /// The returned record carries the post-increment `access_count`.
    async fn resolve_and_increment(&self, code: &str) -> Result<LinkRecord>;

    /// Replace the destination and refresh `updated_at`; the counter is untouched.
    async fn update(&self, code: &str, destination: &str) -> Result<LinkRecord>;

    /// Remove the record; `NotFound` if `code` is not live.
    async fn delete(&self, code: &str) -> Result<()>;

    /// Number of live records.
    async fn count(&self) -> Result<u64>;

    fn backend_name(&self) -> &str;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn LinkStore>> {
        if config.backend.eq_ignore_ascii_case("memory") {
            warn!("Using in-memory storage: links are lost on restart");
            return Ok(Arc::new(MemoryStore::new()));
        }

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;
        if !config.backend.is_empty()
            && backend::normalize_backend_name(&config.backend) != backend_type
        {
            warn!(
                "database.backend '{}' does not match database_url, using '{}'",
                config.backend, backend_type
            );
        }

        let store = SeaOrmStore::new(&config.database_url, &backend_type, config.pool_size).await?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_memory_backend() {
        let config = DatabaseConfig {
            backend: "memory".to_string(),
            ..Default::default()
        };
        let store = StorageFactory::create(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_factory_sqlite_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig {
            backend: "sqlite".to_string(),
            database_url: format!("sqlite://{}", dir.path().join("factory.db").display()),
            pool_size: 2,
        };
        let store = StorageFactory::create(&config).await.unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_factory_rejects_unknown_url() {
        let config = DatabaseConfig {
            backend: "sqlite".to_string(),
            database_url: "mongodb://localhost".to_string(),
            pool_size: 2,
        };
        assert!(StorageFactory::create(&config).await.is_err());
    }
}
