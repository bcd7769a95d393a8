//! User Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role; `admin` unlocks the privileged catalog/order surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Customer,
}

/// User as exposed over the API (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}
