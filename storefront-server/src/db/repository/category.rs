//! Category repository
//!
//! Owns the category tree. Deleting a category never cascades: direct
//! children are re-parented to the root inside the same transaction
//! that removes the row.

use surrealdb::RecordId;

use shared::models::CategoryName;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{CategoryRecord, now_millis};
use crate::db::new_record_key;
use crate::db::query::{FilterValue, ListQuery, Page};
use crate::db::CATEGORY_TABLE;
use crate::utils::ListParams;

/// Fields for a new category; `image` is the stored media filename
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: String,
    pub parent_category: Option<RecordId>,
}

/// Partial update; absent fields stay unchanged.
/// `parent_category` distinguishes keep (`None`), clear
/// (`Some(None)`) and set (`Some(Some(id))`).
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_category: Option<Option<RecordId>>,
}

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(base: BaseRepository) -> Self {
        Self { base }
    }

    pub async fn create(&self, new: NewCategory) -> RepoResult<CategoryRecord> {
        if let Some(parent) = &new.parent_category {
            self.get(parent)
                .await
                .map_err(|_| RepoError::NotFound("Parent category not found".to_string()))?;
        }

        let record = CategoryRecord {
            id: None,
            name: new.name,
            slug: new.slug,
            description: new.description,
            image: new.image,
            parent_category: new.parent_category,
            created_at: now_millis(),
        };
        let created: Option<CategoryRecord> = self
            .base
            .db()
            .create((CATEGORY_TABLE, new_record_key()))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("category create returned no row".to_string()))
    }

    pub async fn get(&self, id: &RecordId) -> RepoResult<CategoryRecord> {
        let found: Option<CategoryRecord> = self.base.db().select(id.clone()).await?;
        found.ok_or_else(|| RepoError::NotFound("Category not found".to_string()))
    }

    /// Paginated listing scoped to one tree level: `parent_id = None`
    /// lists top-level categories only.
    pub async fn list(
        &self,
        params: &ListParams,
        parent: Option<RecordId>,
    ) -> RepoResult<Page<CategoryRecord>> {
        let parent_filter = match parent {
            Some(id) => FilterValue::Record(id),
            None => FilterValue::Missing,
        };
        ListQuery::new(CATEGORY_TABLE)
            .search_prefix("name", &params.search)
            .filter("parent_category", parent_filter)
            .order_by("name", params.direction())
            .page(params.page, params.limit)
            .run(self.base.db())
            .await
    }

    /// `{id, name}` projection over every category, for pickers
    pub async fn names(&self) -> RepoResult<Vec<CategoryName>> {
        let mut response = self
            .base
            .db()
            .query(format!(
                "SELECT <string>id AS id, name FROM {CATEGORY_TABLE} ORDER BY name ASC"
            ))
            .await?;
        Ok(response.take(0)?)
    }

    /// `{id, name}` rows for the given ids, for denormalized joins
    pub async fn names_for(&self, ids: Vec<RecordId>) -> RepoResult<Vec<CategoryName>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut response = self
            .base
            .db()
            .query(format!(
                "SELECT <string>id AS id, name FROM {CATEGORY_TABLE} WHERE id IN $ids"
            ))
            .bind(("ids", ids))
            .await?;
        Ok(response.take(0)?)
    }

    pub async fn update(&self, id: &RecordId, changes: UpdateCategory) -> RepoResult<CategoryRecord> {
        if let Some(Some(parent)) = &changes.parent_category {
            if parent == id {
                return Err(RepoError::Validation(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            self.get(parent)
                .await
                .map_err(|_| RepoError::NotFound("Parent category not found".to_string()))?;
        }

        let mut sets: Vec<&str> = Vec::new();
        if changes.name.is_some() {
            sets.push("name = $name");
        }
        if changes.slug.is_some() {
            sets.push("slug = $slug");
        }
        if changes.description.is_some() {
            sets.push("description = $description");
        }
        if changes.image.is_some() {
            sets.push("image = $image");
        }
        match &changes.parent_category {
            Some(Some(_)) => sets.push("parent_category = $parent"),
            Some(None) => sets.push("parent_category = NONE"),
            None => {}
        }
        if sets.is_empty() {
            return self.get(id).await;
        }

        let sql = format!("UPDATE $record SET {} RETURN AFTER", sets.join(", "));
        let mut query = self.base.db().query(sql).bind(("record", id.clone()));
        if let Some(name) = changes.name {
            query = query.bind(("name", name));
        }
        if let Some(slug) = changes.slug {
            query = query.bind(("slug", slug));
        }
        if let Some(description) = changes.description {
            query = query.bind(("description", description));
        }
        if let Some(image) = changes.image {
            query = query.bind(("image", image));
        }
        if let Some(Some(parent)) = changes.parent_category {
            query = query.bind(("parent", parent));
        }

        let updated: Option<CategoryRecord> = query.await?.check()?.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound("Category not found".to_string()))
    }

    /// Re-parents direct children to the root and deletes the row, as
    /// one transaction. Returns the deleted record so the caller can
    /// clean up its image afterwards.
    pub async fn delete(&self, id: &RecordId) -> RepoResult<CategoryRecord> {
        let existing = self.get(id).await?;
        self.base
            .db()
            .query(format!(
                "BEGIN TRANSACTION;
                 UPDATE {CATEGORY_TABLE} SET parent_category = NONE WHERE parent_category = $record;
                 DELETE $record;
                 COMMIT TRANSACTION;"
            ))
            .bind(("record", id.clone()))
            .await?
            .check()?;
        Ok(existing)
    }
}
