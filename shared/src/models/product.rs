//! Product Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CategoryName;

/// Product as exposed over the API
///
/// `image_urls` are resolved display URLs in upload order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub image_urls: Vec<String>,
    pub category: CategoryName,
    pub created_at: DateTime<Utc>,
}
