//! Category row

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::models::Category;

use super::millis_to_datetime;

/// Row in the `category` table
///
/// `image` holds the stored media filename; resolution to a display URL
/// happens at the API boundary. `slug` carries a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category: Option<RecordId>,
    pub created_at: i64,
}

impl CategoryRecord {
    /// Convert to the API view, with the image already resolved to a URL
    pub fn into_view(self, image_url: String) -> Category {
        Category {
            id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            name: self.name,
            slug: self.slug,
            description: self.description,
            image_url,
            parent_category_id: self.parent_category.map(|id| id.to_string()),
            created_at: millis_to_datetime(self.created_at),
        }
    }
}
