/*
 * Responsibility
 * - Load settings from the environment (DATABASE_URL, JWT_SECRET, VALKEY_URL, CORS ...)
 * - Validate them up front (missing or malformed values fail startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Settings for the token verifier. Kept separate so the secret travels
/// as an explicit value into `TokenVerifier::new`.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub leeway_seconds: u64,
    pub audience: Option<String>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret
        f.debug_struct("JwtConfig")
            .field("leeway_seconds", &self.leeway_seconds)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt: JwtConfig,
    pub auth_cookie_name: String,

    // None => in-process revocation store (development only)
    pub valkey_url: Option<String>,
    pub revocation_key_prefix: String,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// RFC 6265 cookie-name: an RFC 7230 token.
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match var(key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parsed("PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        // The secret is read as-is; surrounding whitespace is part of the key.
        let secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let jwt = JwtConfig {
            secret,
            leeway_seconds: parsed("JWT_LEEWAY_SECONDS", 0)?,
            audience: var("JWT_AUDIENCE"),
        };

        let auth_cookie_name = var("AUTH_COOKIE_NAME").unwrap_or_else(|| "token".to_string());
        if !is_cookie_name(&auth_cookie_name) {
            return Err(ConfigError::Invalid("AUTH_COOKIE_NAME"));
        }

        let valkey_url = var("VALKEY_URL");
        if valkey_url.is_none() && app_env.is_production() {
            // A per-process revocation list would let a logged-out token
            // through on every other instance.
            return Err(ConfigError::Missing("VALKEY_URL"));
        }

        let revocation_key_prefix =
            var("REVOCATION_KEY_PREFIX").unwrap_or_else(|| "auth:revoked".to_string());

        let request_timeout = Duration::from_secs(parsed("REQUEST_TIMEOUT_SECONDS", 30)?);
        let request_body_limit_bytes = parsed("REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            jwt,
            auth_cookie_name,
            valkey_url,
            revocation_key_prefix,
            request_timeout,
            request_body_limit_bytes,
        })
    }
}
