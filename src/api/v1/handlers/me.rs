/*
 * Responsibility
 * - GET /me: the user the gate attached to this request
 */
use axum::Json;

use crate::api::v1::{dto::users::UserResponse, extractors::AuthCtxExtractor};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<UserResponse> {
    Json(ctx.user.into())
}
