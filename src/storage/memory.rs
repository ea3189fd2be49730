//! In-process storage backend
//!
//! Records live in a sharded `DashMap`, so operations on different codes only
//! contend when they hash to the same shard. The click counter is an atomic
//! inside the entry: resolutions take the shard read lock and `fetch_add`,
//! while insert/update/delete take the shard write lock. A resolution
//! therefore observes either the full pre- or the full post-state of any
//! update or delete of the same code.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace};
use uuid::Uuid;

use super::models::timestamp_now;
use super::{LinkRecord, LinkStore};
use crate::errors::{Result, SnaplinkError};

struct LinkEntry {
    id: Uuid,
    destination: String,
    access_count: AtomicU64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LinkEntry {
    fn from_record(record: &LinkRecord) -> Self {
        Self {
            id: record.id,
            destination: record.destination.clone(),
            access_count: AtomicU64::new(record.access_count),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn snapshot(&self, code: &str, access_count: u64) -> LinkRecord {
        LinkRecord {
            id: self.id,
            code: code.to_string(),
            destination: self.destination.clone(),
            access_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    links: DashMap<String, LinkEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(code: &str) -> SnaplinkError {
    SnaplinkError::not_found(format!("Link '{}' not found", code))
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn insert(&self, code: &str, destination: &str) -> Result<LinkRecord> {
        match self.links.entry(code.to_string()) {
            Entry::Occupied(_) => {
                trace!("MemoryStore: insert collided on '{}'", code);
                Err(SnaplinkError::already_exists(format!(
                    "Code '{}' already exists",
                    code
                )))
            }
            Entry::Vacant(slot) => {
                let record = LinkRecord::new(code, destination);
                slot.insert(LinkEntry::from_record(&record));
                debug!("MemoryStore: inserted '{}'", code);
                Ok(record)
            }
        }
    }

    async fn get(&self, code: &str) -> Result<LinkRecord> {
        let entry = self.links.get(code).ok_or_else(|| not_found(code))?;
        Ok(entry.snapshot(code, entry.access_count.load(Ordering::Acquire)))
    }

    async fn resolve_and_increment(&self, code: &str) -> Result<LinkRecord> {
        // 读锁 + 原子自增：同一 shard 上的并发解析互不阻塞
        let entry = self.links.get(code).ok_or_else(|| not_found(code))?;
        let count = entry.access_count.fetch_add(1, Ordering::AcqRel) + 1;
        Ok(entry.snapshot(code, count))
    }

    async fn update(&self, code: &str, destination: &str) -> Result<LinkRecord> {
        let mut entry = self.links.get_mut(code).ok_or_else(|| not_found(code))?;
        entry.destination = destination.to_string();
        entry.updated_at = timestamp_now();
        let count = entry.access_count.load(Ordering::Acquire);
        Ok(entry.snapshot(code, count))
    }

    async fn delete(&self, code: &str) -> Result<()> {
        self.links
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| not_found(code))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.links.len() as u64)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_insert_rejects_live_code() {
        let store = MemoryStore::new();
        let first = store.insert("abc234", "https://a.example").await.unwrap();
        let err = store
            .insert("abc234", "https://b.example")
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        // 原记录未被覆盖
        let current = store.get("abc234").await.unwrap();
        assert_eq!(current, first);
    }

    #[tokio::test]
    async fn test_resolve_increments_and_returns_new_count() {
        let store = MemoryStore::new();
        store.insert("abc234", "https://a.example").await.unwrap();

        let first = store.resolve_and_increment("abc234").await.unwrap();
        let second = store.resolve_and_increment("abc234").await.unwrap();
        assert_eq!(first.access_count, 1);
        assert_eq!(second.access_count, 2);
        assert_eq!(store.get("abc234").await.unwrap().access_count, 2);
    }

    #[tokio::test]
    async fn test_update_keeps_counter_and_created_at() {
        let store = MemoryStore::new();
        let created = store.insert("abc234", "https://a.example").await.unwrap();
        store.resolve_and_increment("abc234").await.unwrap();

        let updated = store.update("abc234", "https://b.example").await.unwrap();
        assert_eq!(updated.destination, "https://b.example");
        assert_eq!(updated.access_count, 1);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_then_reinsert_is_fresh() {
        let store = MemoryStore::new();
        let old = store.insert("abc234", "https://a.example").await.unwrap();
        store.resolve_and_increment("abc234").await.unwrap();
        store.delete("abc234").await.unwrap();

        assert!(store.get("abc234").await.unwrap_err().is_not_found());
        assert!(store.delete("abc234").await.unwrap_err().is_not_found());

        let reborn = store.insert("abc234", "https://c.example").await.unwrap();
        assert_ne!(reborn.id, old.id);
        assert_eq!(reborn.access_count, 0);
        assert_eq!(reborn.destination, "https://c.example");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolves_lose_nothing() {
        let store = Arc::new(MemoryStore::new());
        store.insert("hot234", "https://a.example").await.unwrap();

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..50 {
                        store.resolve_and_increment("hot234").await.unwrap();
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.get("hot234").await.unwrap().access_count, 64 * 50);
    }

    #[tokio::test]
    async fn test_count() {
        let store = MemoryStore::new();
        assert_eq!(store.count().await.unwrap(), 0);
        store.insert("abc234", "https://a.example").await.unwrap();
        store.insert("def567", "https://b.example").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
