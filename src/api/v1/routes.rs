/*
 * Responsibility
 * - URL layout of v1
 * - Decide which routes sit behind the auth gate (everything but /health)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{health::health, me::me, session::logout};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/health", get(health));

    let protected = Router::new()
        .route("/me", access::protect(get(me), &state))
        .route("/logout", access::protect(post(logout), &state));

    public.merge(protected)
}
