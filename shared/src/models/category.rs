//! Category Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category as exposed over the API
///
/// `image_url` is the resolved display URL, not the stored filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: String,
    pub parent_category_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `{id, name}` projection for pickers and denormalized joins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryName {
    pub id: String,
    pub name: String,
}
