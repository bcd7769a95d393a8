//! Product repository

use rust_decimal::Decimal;
use surrealdb::RecordId;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{CategoryRecord, ProductRecord, now_millis};
use crate::db::query::{FilterValue, ListQuery, Page};
use crate::db::{PRODUCT_TABLE, new_record_key};
use crate::utils::ListParams;

/// Fields for a new product; `images` are stored media filenames in
/// upload order
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i64,
    pub images: Vec<String>,
    pub category: RecordId,
}

/// Partial update; absent fields stay unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub images: Option<Vec<String>>,
    pub category: Option<RecordId>,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(base: BaseRepository) -> Self {
        Self { base }
    }

    async fn assert_category_exists(&self, category: &RecordId) -> RepoResult<()> {
        let found: Option<CategoryRecord> = self.base.db().select(category.clone()).await?;
        if found.is_none() {
            return Err(RepoError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, new: NewProduct) -> RepoResult<ProductRecord> {
        self.assert_category_exists(&new.category).await?;

        let record = ProductRecord {
            id: None,
            name: new.name,
            description: new.description,
            price: new.price,
            stock: new.stock,
            images: new.images,
            category: new.category,
            created_at: now_millis(),
        };
        let created: Option<ProductRecord> = self
            .base
            .db()
            .create((PRODUCT_TABLE, new_record_key()))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("product create returned no row".to_string()))
    }

    pub async fn get(&self, id: &RecordId) -> RepoResult<ProductRecord> {
        let found: Option<ProductRecord> = self.base.db().select(id.clone()).await?;
        found.ok_or_else(|| RepoError::NotFound("Product not found".to_string()))
    }

    /// Paginated listing, optionally scoped to one category
    pub async fn list(
        &self,
        params: &ListParams,
        category: Option<RecordId>,
    ) -> RepoResult<Page<ProductRecord>> {
        let mut query = ListQuery::new(PRODUCT_TABLE)
            .search_prefix("name", &params.search)
            .order_by("name", params.direction())
            .page(params.page, params.limit);
        if let Some(category) = category {
            query = query.filter("category", FilterValue::Record(category));
        }
        query.run(self.base.db()).await
    }

    pub async fn update(&self, id: &RecordId, changes: UpdateProduct) -> RepoResult<ProductRecord> {
        if let Some(category) = &changes.category {
            self.assert_category_exists(category).await?;
        }

        let mut sets: Vec<&str> = Vec::new();
        if changes.name.is_some() {
            sets.push("name = $name");
        }
        if changes.description.is_some() {
            sets.push("description = $description");
        }
        if changes.price.is_some() {
            sets.push("price = $price");
        }
        if changes.stock.is_some() {
            sets.push("stock = $stock");
        }
        if changes.images.is_some() {
            sets.push("images = $images");
        }
        if changes.category.is_some() {
            sets.push("category = $category");
        }
        if sets.is_empty() {
            return self.get(id).await;
        }

        let sql = format!("UPDATE $record SET {} RETURN AFTER", sets.join(", "));
        let mut query = self.base.db().query(sql).bind(("record", id.clone()));
        if let Some(name) = changes.name {
            query = query.bind(("name", name));
        }
        if let Some(description) = changes.description {
            query = query.bind(("description", description));
        }
        if let Some(price) = changes.price {
            query = query.bind(("price", price));
        }
        if let Some(stock) = changes.stock {
            query = query.bind(("stock", stock));
        }
        if let Some(images) = changes.images {
            query = query.bind(("images", images));
        }
        if let Some(category) = changes.category {
            query = query.bind(("category", category));
        }

        let updated: Option<ProductRecord> = query.await?.check()?.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound("Product not found".to_string()))
    }

    /// Returns the deleted record so the caller can remove its images
    pub async fn delete(&self, id: &RecordId) -> RepoResult<ProductRecord> {
        let deleted: Option<ProductRecord> = self.base.db().delete(id.clone()).await?;
        deleted.ok_or_else(|| RepoError::NotFound("Product not found".to_string()))
    }
}
