//! LinkService integration tests
//!
//! Runs the create → resolve → update → delete lifecycle against both the
//! in-memory and the SQLite backend, plus collision handling with a
//! degenerate entropy source.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use snaplink::errors::{Result, SnaplinkError};
use snaplink::services::{DEFAULT_MAX_ATTEMPTS, LinkService};
use snaplink::storage::{LinkRecord, LinkStore, MemoryStore, SeaOrmStore};
use snaplink::utils::{CodeGenerator, EntropySource};

// =============================================================================
// Test Setup
// =============================================================================

fn memory_service() -> LinkService {
    LinkService::new(
        Arc::new(MemoryStore::new()),
        CodeGenerator::default(),
        DEFAULT_MAX_ATTEMPTS,
    )
}

async fn sqlite_service(dir: &TempDir) -> LinkService {
    let db_url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("link_service_test.db").display()
    );
    let store = SeaOrmStore::new(&db_url, "sqlite", 5)
        .await
        .expect("Failed to create SQLite store");
    LinkService::new(Arc::new(store), CodeGenerator::default(), DEFAULT_MAX_ATTEMPTS)
}

/// Always picks the first alphabet symbol, so every code is identical.
struct FixedEntropy;

impl EntropySource for FixedEntropy {
    fn pick(&self, _bound: usize) -> usize {
        0
    }
}

/// Wraps a store and counts insert attempts.
struct CountingStore {
    inner: MemoryStore,
    inserts: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            inserts: AtomicUsize::new(0),
        }
    }

    fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkStore for CountingStore {
    async fn insert(&self, code: &str, destination: &str) -> Result<LinkRecord> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(code, destination).await
    }

    async fn get(&self, code: &str) -> Result<LinkRecord> {
        self.inner.get(code).await
    }

    async fn resolve_and_increment(&self, code: &str) -> Result<LinkRecord> {
        self.inner.resolve_and_increment(code).await
    }

    async fn update(&self, code: &str, destination: &str) -> Result<LinkRecord> {
        self.inner.update(code, destination).await
    }

    async fn delete(&self, code: &str) -> Result<()> {
        self.inner.delete(code).await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    fn backend_name(&self) -> &str {
        "counting"
    }
}

// =============================================================================
// Lifecycle (shared by both backends)
// =============================================================================

async fn check_lifecycle(service: &LinkService) {
    let created = service
        .create("https://www.example.com/some/long/url")
        .await
        .unwrap();
    assert_eq!(created.access_count, 0);
    assert_eq!(created.destination, "https://www.example.com/some/long/url");
    assert_eq!(created.created_at, created.updated_at);
    assert!((6..=8).contains(&created.code.len()));

    let stats = service.stats(&created.code).await.unwrap();
    assert_eq!(stats.access_count, 0);

    let resolved = service.resolve(&created.code).await.unwrap();
    assert_eq!(resolved.destination, "https://www.example.com/some/long/url");
    assert_eq!(resolved.access_count, 1);

    service.resolve(&created.code).await.unwrap();
    assert_eq!(service.stats(&created.code).await.unwrap().access_count, 2);

    let updated = service
        .update(&created.code, "https://www.example.com/moved")
        .await
        .unwrap();
    assert_eq!(updated.destination, "https://www.example.com/moved");
    assert_eq!(updated.access_count, 2);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let resolved = service.resolve(&created.code).await.unwrap();
    assert_eq!(resolved.destination, "https://www.example.com/moved");
    assert_eq!(resolved.access_count, 3);

    service.remove(&created.code).await.unwrap();

    assert!(service.resolve(&created.code).await.unwrap_err().is_not_found());
    assert!(service.stats(&created.code).await.unwrap_err().is_not_found());
    assert!(
        service
            .update(&created.code, "https://www.example.com/again")
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(service.remove(&created.code).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_lifecycle_memory() {
    check_lifecycle(&memory_service()).await;
}

#[tokio::test]
async fn test_lifecycle_sqlite() {
    let dir = TempDir::new().unwrap();
    check_lifecycle(&sqlite_service(&dir).await).await;
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_invalid_destination_persists_nothing() {
    let service = memory_service();

    for bad in ["not-a-url", "", "   ", "javascript:alert(1)", "ftp://files.example.com"] {
        let err = service.create(bad).await.unwrap_err();
        assert!(
            matches!(err, SnaplinkError::InvalidUrl(_)),
            "expected InvalidUrl for {:?}, got {:?}",
            bad,
            err
        );
    }

    assert_eq!(service.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_with_invalid_destination_keeps_record() {
    let service = memory_service();
    let created = service.create("https://example.com/a").await.unwrap();

    let err = service.update(&created.code, "not-a-url").await.unwrap_err();
    assert!(matches!(err, SnaplinkError::InvalidUrl(_)));

    let stats = service.stats(&created.code).await.unwrap();
    assert_eq!(stats.destination, "https://example.com/a");
    assert_eq!(stats.updated_at, created.updated_at);
}

#[tokio::test]
async fn test_update_invalid_destination_on_missing_code_is_invalid_url() {
    let service = memory_service();
    let err = service.update("zzzzzzz", "not-a-url").await.unwrap_err();
    assert!(matches!(err, SnaplinkError::InvalidUrl(_)));
}

#[tokio::test]
async fn test_destination_is_trimmed() {
    let service = memory_service();
    let created = service.create("  https://example.com/trim  ").await.unwrap();
    assert_eq!(created.destination, "https://example.com/trim");
}

#[tokio::test]
async fn test_destination_is_stored_normalized() {
    let service = memory_service();

    let created = service
        .create("https://example.com/line\nbreak\ttab")
        .await
        .unwrap();
    assert_eq!(created.destination, "https://example.com/linebreaktab");

    let updated = service
        .update(&created.code, "https://Example.com/\u{4e2d}")
        .await
        .unwrap();
    assert_eq!(updated.destination, "https://example.com/%E4%B8%AD");
    assert_eq!(
        service.resolve(&created.code).await.unwrap().destination,
        "https://example.com/%E4%B8%AD"
    );
}

// =============================================================================
// Code generation and collisions
// =============================================================================

#[tokio::test]
async fn test_created_codes_are_unique() {
    let service = memory_service();
    let mut codes = std::collections::HashSet::new();

    for i in 0..200 {
        let record = service
            .create(&format!("https://example.com/{}", i))
            .await
            .unwrap();
        assert!(codes.insert(record.code));
    }
    assert_eq!(service.store().count().await.unwrap(), 200);
}

#[tokio::test]
async fn test_same_destination_gets_distinct_codes() {
    let service = memory_service();
    let a = service.create("https://example.com/same").await.unwrap();
    let b = service.create("https://example.com/same").await.unwrap();
    assert_ne!(a.code, b.code);
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_degenerate_entropy_exhausts_after_max_attempts() {
    let store = Arc::new(CountingStore::new());
    let service = LinkService::new(
        store.clone(),
        CodeGenerator::with_entropy(6, Arc::new(FixedEntropy)),
        DEFAULT_MAX_ATTEMPTS,
    );

    let first = service.create("https://example.com/first").await.unwrap();
    assert_eq!(first.code, "222222");
    assert_eq!(store.inserts(), 1);

    let err = service.create("https://example.com/second").await.unwrap_err();
    assert!(matches!(err, SnaplinkError::CapacityExhausted(_)));
    assert_eq!(store.inserts(), 1 + DEFAULT_MAX_ATTEMPTS as usize);

    // 失败的创建不应影响已有记录
    assert_eq!(store.count().await.unwrap(), 1);
    let kept = service.stats("222222").await.unwrap();
    assert_eq!(kept.destination, "https://example.com/first");
}

#[tokio::test]
async fn test_custom_max_attempts_is_respected() {
    let store = Arc::new(CountingStore::new());
    let service = LinkService::new(
        store.clone(),
        CodeGenerator::with_entropy(6, Arc::new(FixedEntropy)),
        2,
    );

    service.create("https://example.com/first").await.unwrap();
    let err = service.create("https://example.com/second").await.unwrap_err();
    assert!(matches!(err, SnaplinkError::CapacityExhausted(_)));
    assert_eq!(store.inserts(), 3);
}

#[tokio::test]
async fn test_invalid_destination_never_reaches_store() {
    let store = Arc::new(CountingStore::new());
    let service = LinkService::new(store.clone(), CodeGenerator::default(), 5);

    assert!(service.create("not-a-url").await.is_err());
    assert_eq!(store.inserts(), 0);
}

// =============================================================================
// Concurrency
// =============================================================================

async fn check_concurrent_resolves(service: LinkService, tasks: usize, per_task: usize) {
    let created = service.create("https://example.com/hot").await.unwrap();

    let mut handles = Vec::with_capacity(tasks);
    for _ in 0..tasks {
        let service = service.clone();
        let code = created.code.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..per_task {
                let record = service.resolve(&code).await.unwrap();
                assert_eq!(record.destination, "https://example.com/hot");
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = service.stats(&created.code).await.unwrap();
    assert_eq!(stats.access_count, (tasks * per_task) as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolves_memory() {
    check_concurrent_resolves(memory_service(), 32, 100).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolves_sqlite() {
    let dir = TempDir::new().unwrap();
    check_concurrent_resolves(sqlite_service(&dir).await, 8, 25).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_yield_distinct_codes() {
    let service = memory_service();

    let mut handles = Vec::new();
    for i in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let mut codes = Vec::new();
            for j in 0..20 {
                let record = service
                    .create(&format!("https://example.com/{}/{}", i, j))
                    .await
                    .unwrap();
                codes.push(record.code);
            }
            codes
        }));
    }

    let mut all = std::collections::HashSet::new();
    for handle in handles {
        for code in handle.await.unwrap() {
            assert!(all.insert(code));
        }
    }
    assert_eq!(service.store().count().await.unwrap(), 320);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resolves_racing_update_see_old_or_new_destination() {
    let service = memory_service();
    let created = service.create("https://example.com/old").await.unwrap();

    let resolver = {
        let service = service.clone();
        let code = created.code.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let record = service.resolve(&code).await.unwrap();
                assert!(
                    record.destination == "https://example.com/old"
                        || record.destination == "https://example.com/new"
                );
            }
        })
    };
    service
        .update(&created.code, "https://example.com/new")
        .await
        .unwrap();
    resolver.await.unwrap();

    let stats = service.stats(&created.code).await.unwrap();
    assert_eq!(stats.destination, "https://example.com/new");
    assert_eq!(stats.access_count, 200);
}
