//! Product row

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::models::{CategoryName, Product};

use super::millis_to_datetime;

/// Row in the `product` table
///
/// `images` holds stored media filenames in upload order; the first one
/// doubles as the cover image on order items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub images: Vec<String>,
    pub category: RecordId,
    pub created_at: i64,
}

impl ProductRecord {
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Convert to the API view, with images resolved and the category
    /// name already looked up
    pub fn into_view(self, image_urls: Vec<String>, category: CategoryName) -> Product {
        Product {
            id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image_urls,
            category,
            created_at: millis_to_datetime(self.created_at),
        }
    }
}
