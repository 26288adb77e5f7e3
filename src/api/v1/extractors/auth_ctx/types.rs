/*
 * Responsibility
 * - The authenticated context handlers see
 * - The auth middleware builds it and stores it in request extensions;
 *   handlers only ever receive this type
 *
 * Notes
 * - Lives for one request; nothing here is persisted or shared
 */
use crate::repos::user_repo::UserRecord;
use crate::services::auth::Authenticated;

/// Context attached to a request that passed the auth gate.
///
/// - `user` is the User Store record for the token's subject
/// - `token` / `expires_at` are kept so `/logout` can revoke exactly what was presented
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user: UserRecord,
    pub token: String,
    pub expires_at: u64,
}

impl From<Authenticated> for AuthCtx {
    fn from(auth: Authenticated) -> Self {
        Self {
            user: auth.user,
            token: auth.token,
            expires_at: auth.verified.expires_at,
        }
    }
}
