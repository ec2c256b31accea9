//! Cache-aside accelerator for the aggregate endpoints.
//!
//! The cache is never the system of record: a miss, a stale entry or a
//! broken backend all fall through to the authoritative store. Keys embed
//! the practice id so entries can never cross the tenant boundary.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;

/// Best-effort key-value cache. Implementations must swallow backend
/// failures (returning `None` / ignoring writes) - a broken cache slows a
/// request down, it never fails one.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value, ttl: Duration);
    async fn invalidate(&self, key: &str);
}

/// In-process TTL map. Entries transition Absent -> Fresh on write and
/// Fresh -> Stale once the deadline passes; stale entries read as absent and
/// are dropped on the next write or invalidation.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (Value, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((value, deadline)) if Instant::now() < *deadline => Some(value.clone()),
            _ => None,
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let deadline = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, deadline));
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

pub fn cache_key(practice_id: Uuid, resource: &str) -> String {
    format!("{}:{}", practice_id, resource)
}

/// Read-through: serve a fresh cached value if one exists, otherwise run
/// `compute` against the authoritative store and refill the entry.
pub async fn get_or_compute<F, Fut>(
    cache: &dyn CacheStore,
    practice_id: Uuid,
    resource: &str,
    ttl: Duration,
    compute: F,
) -> Result<Value, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<Value, ApiError>>,
{
    let key = cache_key(practice_id, resource);

    if let Some(hit) = cache.get(&key).await {
        return Ok(hit);
    }

    let value = compute().await?;
    cache.set(&key, value.clone(), ttl).await;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn hit_within_ttl_skips_compute() {
        let cache = MemoryCache::new();
        let practice = Uuid::new_v4();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = get_or_compute(&cache, practice, "badges", Duration::from_secs(60), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(json!({"tasks": 4})) }
            })
            .await
            .unwrap();
            assert_eq!(value["tasks"], 4);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_entry_recomputes() {
        let cache = MemoryCache::new();
        let practice = Uuid::new_v4();
        let calls = AtomicUsize::new(0);

        let ttl = Duration::from_millis(20);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(json!(1)) }
        };

        get_or_compute(&cache, practice, "stats", ttl, compute).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        get_or_compute(&cache, practice, "stats", ttl, compute).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn keys_are_practice_scoped() {
        let cache = MemoryCache::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let ttl = Duration::from_secs(60);

        let va = get_or_compute(&cache, a, "badges", ttl, || async { Ok(json!("a")) })
            .await
            .unwrap();
        let vb = get_or_compute(&cache, b, "badges", ttl, || async { Ok(json!("b")) })
            .await
            .unwrap();

        assert_eq!(va, json!("a"));
        assert_eq!(vb, json!("b"));
    }

    #[tokio::test]
    async fn invalidate_forces_recompute() {
        let cache = MemoryCache::new();
        let practice = Uuid::new_v4();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(json!(true)) }
        };

        get_or_compute(&cache, practice, "badges", ttl, compute).await.unwrap();
        cache.invalidate(&cache_key(practice, "badges")).await;
        get_or_compute(&cache, practice, "badges", ttl, compute).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn compute_failure_is_not_cached() {
        let cache = MemoryCache::new();
        let practice = Uuid::new_v4();

        let err = get_or_compute(&cache, practice, "stats", Duration::from_secs(60), || async {
            Err::<Value, _>(ApiError::Upstream("db down".into()))
        })
        .await;
        assert!(err.is_err());

        // Next call still reaches compute
        let ok = get_or_compute(&cache, practice, "stats", Duration::from_secs(60), || async {
            Ok(json!(7))
        })
        .await
        .unwrap();
        assert_eq!(ok, json!(7));
    }
}
