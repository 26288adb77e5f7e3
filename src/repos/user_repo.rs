/*
 * Responsibility
 * - Read-only lookup of users by id for the auth gate
 * - `UserStore` is the seam the gate depends on; `PgUserStore` is the SQLx-backed one
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

/// The authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    #[sqlx(rename = "imageUrl")]
    pub image_url: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, RepoError>;
}

pub async fn get(db: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>, RepoError> {
    let row = sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT "userId", "userName", "imageUrl"
        FROM users
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        get(&self.pool, user_id).await
    }
}
