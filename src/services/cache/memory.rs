use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use std::time::{Duration, Instant};

use crate::services::cache::client::{CacheClient, CacheResult};

/// In-process cache with per-key expiry, backed by `moka`.
///
/// Used when no Valkey URL is configured (development) and in tests.
/// Entries are not shared across processes. There is no capacity bound:
/// an evicted revocation would let its token back in.
#[derive(Clone, Debug)]
pub struct MemoryCache {
    entries: Cache<String, Stored>,
}

#[derive(Clone, Debug)]
struct Stored {
    value: String,
    ttl: Duration,
}

/// Each entry lives for the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Stored> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        stored: &Stored,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(stored.ttl)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().expire_after(PerEntryTtl).build(),
        }
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.get(key).await.map(|stored| stored.value))
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<bool> {
        // Same clamp as the Valkey client.
        let stored = Stored {
            value: value.to_string(),
            ttl: ttl.max(Duration::from_secs(1)),
        };

        // `or_insert_with` is atomic per key; `is_fresh` tells whether this call won.
        let entry = self
            .entries
            .entry_by_ref(key)
            .or_insert_with(async move { stored })
            .await;

        Ok(entry.is_fresh())
    }
}
