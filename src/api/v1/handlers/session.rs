/*
 * Responsibility
 * - POST /logout: revoke the presented token for as long as it would still be accepted
 * - Clear the auth cookie on the client
 */
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{api::v1::extractors::AuthCtxExtractor, error::AppError, state::AppState};

pub async fn logout(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Response, AppError> {
    let ttl = state
        .auth
        .revoke(&ctx.token, ctx.expires_at)
        .await
        .map_err(|err| {
            tracing::error!(user_id = %ctx.user.id, error = %err, "failed to revoke token");
            AppError::from(err)
        })?;

    tracing::info!(user_id = %ctx.user.id, ttl_secs = ttl.as_secs(), "token revoked");

    let mut res = StatusCode::NO_CONTENT.into_response();
    match clear_cookie(state.auth.cookie_name()) {
        Ok(value) => {
            res.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(err) => {
            // `Config` validates the name; a gate built by hand may not.
            tracing::warn!(
                cookie = state.auth.cookie_name(),
                error = %err,
                "auth cookie not cleared"
            );
        }
    }

    Ok(res)
}

fn clear_cookie(name: &str) -> Result<HeaderValue, header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"))
}
