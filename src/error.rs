/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse (HTTP status + `{ "message": ... }` JSON body)
 * - Fold service-level errors (auth / repo / revocation) into one response shape
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;
use crate::services::auth::revocation::RevocationError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Auth(err) => (err.status(), err.to_string()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_string(),
            ),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(_) => AppError::Internal,
        }
    }
}

impl From<RevocationError> for AppError {
    fn from(_: RevocationError) -> Self {
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(res: Response) -> ErrorResponse {
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn auth_errors_map_to_status_and_message() {
        let cases = [
            (AuthError::MissingCredential, StatusCode::UNAUTHORIZED),
            (AuthError::RevokedCredential, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidCredential, StatusCode::BAD_REQUEST),
            (AuthError::UnknownPrincipal, StatusCode::UNAUTHORIZED),
        ];

        for (err, status) in cases {
            let expected = err.to_string();
            let res = AppError::from(err).into_response();
            assert_eq!(res.status(), status);
            assert_eq!(body_of(res).await.message, expected);
        }
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let res = AppError::from(RepoError::Db(sqlx::Error::PoolTimedOut)).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(res).await;
        assert_eq!(body.message, "Internal server error.");
    }
}
