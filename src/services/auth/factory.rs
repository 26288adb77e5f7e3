//! Factory: build the `AuthGate` and its collaborators from `Config`.
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::repos::user_repo::PgUserStore;
use crate::services::auth::{
    AuthGate,
    revocation::{CacheRevocationStore, RevocationStore},
    token::TokenVerifier,
};
use crate::services::cache::MemoryCache;

pub async fn build_auth_gate(config: &Config, db: PgPool) -> Result<Arc<AuthGate>, AppError> {
    let revocations: Arc<dyn RevocationStore> = match &config.valkey_url {
        Some(url) => {
            let store = CacheRevocationStore::connect(url, config.revocation_key_prefix.clone())
                .await
                .map_err(|err| {
                    tracing::error!(error = %err, "failed to connect revocation store");
                    AppError::Internal
                })?;
            tracing::info!(backend = store.backend_name(), "revocation store ready");
            Arc::new(store)
        }
        None => {
            tracing::warn!("VALKEY_URL not set; revocations are kept in process memory");
            Arc::new(CacheRevocationStore::new_with_cache(
                Arc::new(MemoryCache::new()),
                config.revocation_key_prefix.clone(),
            ))
        }
    };

    let gate = AuthGate::new(
        TokenVerifier::new(&config.jwt),
        revocations,
        Arc::new(PgUserStore::new(db)),
        config.auth_cookie_name.clone(),
    );

    Ok(Arc::new(gate))
}
