use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::services::cache::CacheError;

/// A token that was invalidated before its natural expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationEntry {
    pub token_digest: String,
    // None when the stored value could not be read back as a timestamp.
    // The entry still counts as a revocation.
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Lookup/record of revoked bearer tokens.
///
/// Lookups match the exact token string. `Err(_)` means the backend could
/// not answer; the gate treats that as a failed authentication.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn find_by_token(&self, token: &str) -> Result<Option<RevocationEntry>, RevocationError>;

    // Record `token` as revoked for `ttl` (its remaining lifetime).
    // Revoking an already revoked token is not an error.
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// SHA-256 of the token, base64url without padding.
///
/// Stores key on this instead of the raw bearer token; equality of digests
/// stands in for equality of token strings.
pub fn token_digest(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}
