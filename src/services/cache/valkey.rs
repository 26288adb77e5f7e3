use async_trait::async_trait;
use redis::{AsyncCommands, ExistenceCheck, SetExpiry, SetOptions, aio::ConnectionManager};
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Shared revocation list on Valkey (or any Redis-protocol server).
///
/// A revocation is one string key holding its revocation time. Reads are a
/// plain `GET` so the rejection log can carry that time; writes are
/// `SET NX EX` so the first revocation wins and the key dies with the token.
#[derive(Clone, Debug)]
pub struct ValkeyClient {
    conn: ConnectionManager,
}

impl ValkeyClient {
    /// Connect eagerly so a bad `VALKEY_URL` fails at startup.
    /// `ConnectionManager` reconnects on its own afterwards.
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let conn = redis::Client::open(url)
            .map_err(connection_error)?
            .get_connection_manager()
            .await
            .map_err(connection_error)?;

        Ok(Self { conn })
    }
}

fn connection_error(e: redis::RedisError) -> CacheError {
    CacheError::BackendConnection(e.to_string())
}

fn command_error(e: redis::RedisError) -> CacheError {
    CacheError::BackendCommand(e.to_string())
}

// EX is whole seconds and must be positive.
fn set_nx_ex(ttl: Duration) -> SetOptions {
    SetOptions::default()
        .conditional_set(ExistenceCheck::NX)
        .with_expiration(SetExpiry::EX(ttl.as_secs().max(1)))
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(command_error)
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<bool> {
        let mut conn = self.conn.clone();

        // `OK` when written, nil when the key was already there.
        let reply = conn
            .set_options::<_, _, Option<String>>(key, value, set_nx_ex(ttl))
            .await
            .map_err(command_error)?;

        tracing::debug!(key = %key, written = reply.is_some(), "valkey SET NX");
        Ok(reply.is_some())
    }
}
