//! The auth gate: extract → check revocation → verify → resolve user.
//!
//! Every rejection is terminal and maps to one `AuthError`. Collaborator
//! failures (revocation backend, user store) are logged and reported as
//! `InvalidCredential`; nothing is retried.

use axum::http::StatusCode;
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::repos::user_repo::{UserRecord, UserStore};
use crate::services::auth::credentials::Credentials;
use crate::services::auth::revocation::{RevocationError, RevocationStore, token_digest};
use crate::services::auth::token::{TokenVerifier, VerifiedToken};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Access denied. No token provided.")]
    MissingCredential,
    #[error("Token has been revoked.")]
    RevokedCredential,
    #[error("Invalid token.")]
    InvalidCredential,
    #[error("User not found.")]
    UnknownPrincipal,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredential => StatusCode::BAD_REQUEST,
            Self::MissingCredential | Self::RevokedCredential | Self::UnknownPrincipal => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

/// Result of a successful pass through the gate.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: UserRecord,
    pub token: String,
    pub verified: VerifiedToken,
}

pub struct AuthGate {
    verifier: TokenVerifier,
    revocations: Arc<dyn RevocationStore>,
    users: Arc<dyn UserStore>,
    cookie_name: String,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("verifier", &self.verifier)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl AuthGate {
    pub fn new(
        verifier: TokenVerifier,
        revocations: Arc<dyn RevocationStore>,
        users: Arc<dyn UserStore>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            revocations,
            users,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Revoke `token` for as long as the verifier would still accept it.
    ///
    /// Returns the TTL the revocation was stored with.
    pub async fn revoke(
        &self,
        token: &str,
        expires_at: u64,
    ) -> Result<Duration, RevocationError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let ttl = revocation_ttl(expires_at, self.verifier.leeway_seconds(), now);
        self.revocations.revoke(token, ttl).await?;
        Ok(ttl)
    }

    pub async fn authenticate(
        &self,
        credentials: &Credentials<'_>,
    ) -> Result<Authenticated, AuthError> {
        let token = credentials.token().ok_or_else(|| {
            tracing::warn!(reason = "missing_credential", "no bearer token presented");
            AuthError::MissingCredential
        })?;

        // Log a digest prefix only, never the token.
        let digest = token_digest(token);
        let token_ref = &digest[..8];

        // Revocation is checked before the signature on purpose: a revoked
        // token stays rejected even while it would still verify.
        match self.revocations.find_by_token(token).await {
            Ok(Some(entry)) => {
                tracing::warn!(
                    reason = "revoked_credential",
                    token = %token_ref,
                    revoked_at = ?entry.revoked_at,
                    "revoked token presented"
                );
                return Err(AuthError::RevokedCredential);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    reason = "revocation_backend",
                    token = %token_ref,
                    error = %err,
                    "revocation lookup failed"
                );
                return Err(AuthError::InvalidCredential);
            }
        }

        let verified = match self.verifier.verify(token) {
            Ok(verified) => verified,
            Err(err) => {
                tracing::warn!(
                    reason = "invalid_credential",
                    token = %token_ref,
                    error = %err,
                    "token verification failed"
                );
                return Err(AuthError::InvalidCredential);
            }
        };

        let user = match self.users.find_by_id(verified.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(
                    reason = "unknown_principal",
                    user_id = %verified.user_id,
                    "token subject has no user"
                );
                return Err(AuthError::UnknownPrincipal);
            }
            Err(err) => {
                tracing::warn!(
                    reason = "user_store",
                    user_id = %verified.user_id,
                    error = %err,
                    "user lookup failed"
                );
                return Err(AuthError::InvalidCredential);
            }
        };

        tracing::debug!(user_id = %user.id, "request authenticated");

        Ok(Authenticated {
            user,
            token: token.to_string(),
            verified,
        })
    }
}

/// Remaining acceptance window of a token: `exp + leeway - now`, at least 1 s.
///
/// A revocation that expires before the verifier stops accepting the token
/// would make the token valid again.
pub fn revocation_ttl(expires_at: u64, leeway_seconds: u64, now: u64) -> Duration {
    let accepted_until = expires_at.saturating_add(leeway_seconds);
    Duration::from_secs(accepted_until.saturating_sub(now).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::testing::{
        FailingRevocations, FailingUsers, SECRET, StaticUsers, gate, gate_with, gate_with_config,
        jwt_config, now, revocations, sign, user,
    };
    use uuid::Uuid;

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn no_credentials_is_missing() {
        let (gate, _) = gate(vec![]);
        let err = gate.authenticate(&Credentials::default()).await.unwrap_err();
        assert_eq!(err, AuthError::MissingCredential);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn authorization_without_second_field_is_missing() {
        let (gate, _) = gate(vec![]);
        let creds = Credentials {
            cookie_token: None,
            authorization: Some("Bearer"),
        };
        assert_eq!(
            gate.authenticate(&creds).await.unwrap_err(),
            AuthError::MissingCredential
        );
    }

    #[tokio::test]
    async fn valid_token_resolves_user() {
        let alice = user("alice");
        let (gate, _) = gate(vec![alice.clone()]);
        let exp = now() + 3600;
        let token = sign(SECRET, alice.id, exp);
        let header = bearer(&token);

        let ok = gate
            .authenticate(&Credentials {
                cookie_token: None,
                authorization: Some(&header),
            })
            .await
            .unwrap();

        assert_eq!(ok.user, alice);
        assert_eq!(ok.token, token);
        assert_eq!(ok.verified.expires_at, exp);
    }

    #[tokio::test]
    async fn revoked_token_is_rejected_even_if_valid() {
        let alice = user("alice");
        let (gate, revocations) = gate(vec![alice.clone()]);
        let token = sign(SECRET, alice.id, now() + 3600);
        revocations
            .revoke(&token, Duration::from_secs(3600))
            .await
            .unwrap();

        let err = gate
            .authenticate(&Credentials {
                cookie_token: Some(&token),
                authorization: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::RevokedCredential);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn revoked_garbage_is_still_reported_as_revoked() {
        let (gate, revocations) = gate(vec![]);
        revocations
            .revoke("not-a-jwt", Duration::from_secs(60))
            .await
            .unwrap();

        let err = gate
            .authenticate(&Credentials {
                cookie_token: Some("not-a-jwt"),
                authorization: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::RevokedCredential);
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let alice = user("alice");
        let (gate, _) = gate(vec![alice.clone()]);
        let token = sign("other-secret", alice.id, now() + 3600);

        let err = gate
            .authenticate(&Credentials {
                cookie_token: Some(&token),
                authorization: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredential);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn expired_token_is_invalid() {
        let alice = user("alice");
        let (gate, _) = gate(vec![alice.clone()]);
        let token = sign(SECRET, alice.id, now() - 3600);

        assert_eq!(
            gate.authenticate(&Credentials {
                cookie_token: Some(&token),
                authorization: None,
            })
            .await
            .unwrap_err(),
            AuthError::InvalidCredential
        );
    }

    #[tokio::test]
    async fn unknown_subject_is_unknown_principal() {
        let (gate, _) = gate(vec![user("alice")]);
        let token = sign(SECRET, Uuid::new_v4(), now() + 3600);

        assert_eq!(
            gate.authenticate(&Credentials {
                cookie_token: Some(&token),
                authorization: None,
            })
            .await
            .unwrap_err(),
            AuthError::UnknownPrincipal
        );
    }

    #[tokio::test]
    async fn cookie_token_is_the_one_evaluated() {
        let alice = user("alice");
        let bob = user("bob");
        let (gate, _) = gate(vec![alice.clone(), bob.clone()]);
        let cookie = sign(SECRET, alice.id, now() + 3600);
        let header = bearer(&sign(SECRET, bob.id, now() + 3600));

        let ok = gate
            .authenticate(&Credentials {
                cookie_token: Some(&cookie),
                authorization: Some(&header),
            })
            .await
            .unwrap();
        assert_eq!(ok.user, alice);
    }

    #[tokio::test]
    async fn bad_cookie_does_not_fall_back_to_good_header() {
        let alice = user("alice");
        let (gate, _) = gate(vec![alice.clone()]);
        let header = bearer(&sign(SECRET, alice.id, now() + 3600));

        assert_eq!(
            gate.authenticate(&Credentials {
                cookie_token: Some("garbage"),
                authorization: Some(&header),
            })
            .await
            .unwrap_err(),
            AuthError::InvalidCredential
        );
    }

    #[tokio::test]
    async fn same_request_twice_gives_same_decision() {
        let alice = user("alice");
        let (gate, _) = gate(vec![alice.clone()]);
        let token = sign(SECRET, alice.id, now() + 3600);
        let creds = Credentials {
            cookie_token: Some(&token),
            authorization: None,
        };

        let first = gate.authenticate(&creds).await.unwrap();
        let second = gate.authenticate(&creds).await.unwrap();
        assert_eq!(first.user, second.user);
    }

    #[tokio::test]
    async fn revocation_backend_failure_is_invalid() {
        let alice = user("alice");
        let gate = gate_with(
            Arc::new(FailingRevocations),
            Arc::new(StaticUsers::new(vec![alice.clone()])),
        );
        let token = sign(SECRET, alice.id, now() + 3600);

        assert_eq!(
            gate.authenticate(&Credentials {
                cookie_token: Some(&token),
                authorization: None,
            })
            .await
            .unwrap_err(),
            AuthError::InvalidCredential
        );
    }

    #[tokio::test]
    async fn user_store_failure_is_invalid() {
        let (_, revocations) = gate(vec![]);
        let gate = gate_with(revocations, Arc::new(FailingUsers));
        let token = sign(SECRET, Uuid::new_v4(), now() + 3600);

        assert_eq!(
            gate.authenticate(&Credentials {
                cookie_token: Some(&token),
                authorization: None,
            })
            .await
            .unwrap_err(),
            AuthError::InvalidCredential
        );
    }

    #[test]
    fn revocation_ttl_covers_leeway() {
        assert_eq!(revocation_ttl(1_000, 0, 400), Duration::from_secs(600));
        assert_eq!(revocation_ttl(1_000, 60, 400), Duration::from_secs(660));
        // Expired but still inside the leeway window.
        assert_eq!(revocation_ttl(1_000, 60, 1_030), Duration::from_secs(30));
        // Past the window: clamp.
        assert_eq!(revocation_ttl(1_000, 60, 5_000), Duration::from_secs(1));
        assert_eq!(revocation_ttl(u64::MAX, 60, 0), Duration::from_secs(u64::MAX));
    }

    #[tokio::test]
    async fn revoke_outlives_leeway_accepted_token() {
        let alice = user("alice");
        let mut config = jwt_config();
        config.leeway_seconds = 60;
        let revocations = revocations();
        let gate = gate_with_config(
            &config,
            revocations.clone(),
            Arc::new(StaticUsers::new(vec![alice.clone()])),
        );

        // Expired 30 s ago, still accepted thanks to the leeway.
        let exp = now() - 30;
        let token = sign(SECRET, alice.id, exp);
        let creds = Credentials {
            cookie_token: Some(&token),
            authorization: None,
        };
        assert!(gate.authenticate(&creds).await.is_ok());

        let ttl = gate.revoke(&token, exp).await.unwrap();
        assert!(ttl >= Duration::from_secs(29), "ttl {ttl:?} ends before the leeway");
        assert!(ttl <= Duration::from_secs(30));

        // Still revoked once the bare `exp`-based TTL (1 s) would have lapsed.
        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(
            gate.authenticate(&creds).await.unwrap_err(),
            AuthError::RevokedCredential
        );
    }

    #[tokio::test]
    async fn revoke_reports_backend_failure() {
        let gate = gate_with(
            Arc::new(FailingRevocations),
            Arc::new(StaticUsers::new(vec![])),
        );
        let token = sign(SECRET, Uuid::new_v4(), now() + 3600);
        assert!(gate.revoke(&token, now() + 3600).await.is_err());
    }
}
