//! User row

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::models::{User, UserRole};

use super::millis_to_datetime;

/// Row in the `user` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub created_at: i64,
}

impl UserRecord {
    pub fn into_view(self, profile_image_url: Option<String>) -> User {
        User {
            id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            name: self.name,
            email: self.email,
            role: self.role,
            profile_image: profile_image_url,
            created_at: millis_to_datetime(self.created_at),
        }
    }
}
