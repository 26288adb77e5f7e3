use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;

/// Errors returned by token verification + claim validation.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("missing or empty subject claim")]
    EmptySubject,
    #[error("invalid 'sub' (expected UUID)")]
    InvalidSubject,
}

/// Bearer token claims.
///
/// The user id is read from `_id` when present, else from `sub`. Both are
/// optional here so a token carrying both still deserializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    // String or array; checked by `Validation` when an audience is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
}

/// What the rest of the service gets out of a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: Uuid,
    pub expires_at: u64,
}

/// HS256 verifier bound to the configured shared secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key,
            validation,
        }
    }

    /// Clock skew tolerated past `exp`; a token stays acceptable this long.
    pub fn leeway_seconds(&self) -> u64 {
        self.validation.leeway
    }

    /// Verify signature + expiry and decode the claims.
    ///
    /// `jsonwebtoken::Validation` checks the signature, the algorithm
    /// (HS256 only), `exp` (required) and `aud` when configured.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, VerificationError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Entry point for the gate: decode, then promote the subject to a user id.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, VerificationError> {
        let claims = self.decode(token)?;

        let sub = claims
            .id
            .as_deref()
            .or(claims.sub.as_deref())
            .unwrap_or_default()
            .trim();
        if sub.is_empty() {
            return Err(VerificationError::EmptySubject);
        }
        let user_id = Uuid::parse_str(sub).map_err(|_| VerificationError::InvalidSubject)?;

        Ok(VerifiedToken {
            user_id,
            expires_at: claims.exp,
        })
    }
}
