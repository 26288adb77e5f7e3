//! Candidate-token extraction from an inbound request.
//!
//! Pure: no I/O, no errors. A request either carries a candidate token or
//! it does not; whether that token is any good is the gate's business.

use axum::http::{HeaderMap, header};

/// The two places a client may present a bearer token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub cookie_token: Option<&'a str>,
    pub authorization: Option<&'a str>,
}

impl<'a> Credentials<'a> {
    /// Collect the auth cookie (by name) and the raw `Authorization` value.
    ///
    /// Header values that are not visible ASCII are treated as absent.
    pub fn from_headers(headers: &'a HeaderMap, cookie_name: &str) -> Self {
        let cookie_token = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|raw| find_cookie(raw, cookie_name));

        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        Self {
            cookie_token,
            authorization,
        }
    }

    /// The token to evaluate: the cookie wins; otherwise the second
    /// whitespace-separated field of `Authorization` (`Bearer <token>`).
    pub fn token(&self) -> Option<&'a str> {
        self.cookie_token
            .filter(|t| !t.is_empty())
            .or_else(|| self.authorization.and_then(|v| v.split_whitespace().nth(1)))
    }
}

fn find_cookie<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().trim_matches('"'))
}
