use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};

use crate::services::{
    auth::revocation::store::{RevocationEntry, RevocationError, RevocationStore, token_digest},
    cache::{CacheClient, ValkeyClient},
};

/// Revocation store on top of any `CacheClient` (Valkey in production).
///
/// Key: `<prefix>:<token digest>`, value: RFC 3339 revocation time.
/// Entries expire with the token they revoke.
#[derive(Clone)]
pub struct CacheRevocationStore<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions across environments
    prefix: String,
}

impl CacheRevocationStore<ValkeyClient> {
    pub async fn connect(
        valkey_url: &str,
        prefix: impl Into<String>,
    ) -> Result<Self, RevocationError> {
        let client = ValkeyClient::new(valkey_url).await?;
        Ok(Self::new_with_cache(Arc::new(client), prefix))
    }
}

impl<C: CacheClient> CacheRevocationStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, token: &str) -> String {
        format!("{}:{}", self.prefix, token_digest(token))
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }
}

#[async_trait]
impl<C: CacheClient> RevocationStore for CacheRevocationStore<C> {
    async fn find_by_token(&self, token: &str) -> Result<Option<RevocationEntry>, RevocationError> {
        let Some(raw) = self.cache.get_string(&self.key(token)).await? else {
            return Ok(None);
        };

        let revoked_at = DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|t| t.with_timezone(&Utc));

        Ok(Some(RevocationEntry {
            token_digest: token_digest(token),
            revoked_at,
        }))
    }

    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        let key = self.key(token);
        let now = Utc::now().to_rfc3339();

        // NX: the first revocation time wins.
        let created = self.cache.set_if_absent_with_ttl(&key, &now, ttl).await?;
        if !created {
            tracing::debug!(key = %key, "token already revoked");
        }

        Ok(())
    }
}
