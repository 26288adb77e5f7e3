//! Test doubles and token minting shared by the auth tests.

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc, time::Duration};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::repos::{
    error::RepoError,
    user_repo::{UserRecord, UserStore},
};
use crate::services::auth::{
    AuthGate,
    revocation::{CacheRevocationStore, RevocationEntry, RevocationError, RevocationStore},
    token::{TokenClaims, TokenVerifier},
};
use crate::services::cache::{CacheError, MemoryCache};

pub const SECRET: &str = "test-secret-key";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: SECRET.to_string(),
        leeway_seconds: 0,
        audience: None,
    }
}

pub fn now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

pub fn sign_claims<T: Serialize>(secret: &str, claims: &T) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn sign(secret: &str, user_id: Uuid, exp: u64) -> String {
    sign_claims(
        secret,
        &TokenClaims {
            sub: Some(user_id.to_string()),
            exp,
            iat: Some(now()),
            ..TokenClaims::default()
        },
    )
}

pub fn user(name: &str) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        user_name: name.to_string(),
        image_url: None,
    }
}

pub struct StaticUsers(HashMap<Uuid, UserRecord>);

impl StaticUsers {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

#[async_trait]
impl UserStore for StaticUsers {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.0.get(&user_id).cloned())
    }
}

pub struct FailingUsers;

#[async_trait]
impl UserStore for FailingUsers {
    async fn find_by_id(&self, _user_id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }
}

pub struct FailingRevocations;

#[async_trait]
impl RevocationStore for FailingRevocations {
    async fn find_by_token(&self, _token: &str) -> Result<Option<RevocationEntry>, RevocationError> {
        Err(CacheError::BackendConnection("connection refused".to_string()).into())
    }

    async fn revoke(&self, _token: &str, _ttl: Duration) -> Result<(), RevocationError> {
        Err(CacheError::BackendConnection("connection refused".to_string()).into())
    }
}

pub type MemoryRevocations = CacheRevocationStore<MemoryCache>;

pub fn revocations() -> Arc<MemoryRevocations> {
    Arc::new(CacheRevocationStore::new_with_cache(
        Arc::new(MemoryCache::new()),
        "test:revoked",
    ))
}

pub fn gate_with(revocations: Arc<dyn RevocationStore>, users: Arc<dyn UserStore>) -> AuthGate {
    gate_with_config(&jwt_config(), revocations, users)
}

pub fn gate_with_config(
    config: &JwtConfig,
    revocations: Arc<dyn RevocationStore>,
    users: Arc<dyn UserStore>,
) -> AuthGate {
    AuthGate::new(TokenVerifier::new(config), revocations, users, "token")
}

/// Gate over in-memory stores. The revocation store is returned so tests
/// can revoke tokens behind the gate's back.
pub fn gate(users: Vec<UserRecord>) -> (AuthGate, Arc<MemoryRevocations>) {
    let revocations = revocations();
    let gate = gate_with(revocations.clone(), Arc::new(StaticUsers::new(users)));
    (gate, revocations)
}
