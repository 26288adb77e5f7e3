/*
 * Responsibility
 * - Response DTO for the authenticated user
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::UserRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub user_name: String,
    pub image_url: Option<String>,
}

impl From<UserRecord> for UserResponse {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            user_name: u.user_name,
            image_url: u.image_url,
        }
    }
}
