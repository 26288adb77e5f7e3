//! Bearer token gate → AuthCtx in request extensions.
//!
//! Runs the `AuthGate` on every request routed through it. On success the
//! request continues with `AuthCtx` attached; on failure the gate's error is
//! returned as the response and the inner handler never runs.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::Credentials;
use crate::state::AppState;

/// Put the gate in front of the handlers of one route.
///
/// Applied per `MethodRouter` so a method the route does not serve still
/// gets `405` instead of an auth rejection.
///
/// ```ignore
/// .route("/me", access::protect(get(me), &state))
/// ```
pub fn protect(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    // `from_fn_with_state` so the middleware can take `State<AppState>`
    route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        access_middleware,
    ))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let authenticated = {
        let credentials = Credentials::from_headers(req.headers(), state.auth.cookie_name());
        state.auth.authenticate(&credentials).await?
    };

    // middleware → extractor
    req.extensions_mut().insert(AuthCtx::from(authenticated));

    Ok(next.run(req).await)
}
