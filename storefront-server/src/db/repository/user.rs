//! User repository
//!
//! Accounts are provisioned out of band; this side only lists and
//! resolves them.

use surrealdb::RecordId;

use shared::models::{CustomerBrief, UserRole};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{UserRecord, now_millis};
use crate::db::query::{ListQuery, Page};
use crate::db::{USER_TABLE, new_record_key};
use crate::utils::ListParams;

/// Fields for a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub profile_image: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(base: BaseRepository) -> Self {
        Self { base }
    }

    pub async fn create(&self, new: NewUser) -> RepoResult<UserRecord> {
        let record = UserRecord {
            id: None,
            name: new.name,
            email: new.email,
            role: new.role,
            profile_image: new.profile_image,
            created_at: now_millis(),
        };
        let created: Option<UserRecord> = self
            .base
            .db()
            .create((USER_TABLE, new_record_key()))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("user create returned no row".to_string()))
    }

    pub async fn get(&self, id: &RecordId) -> RepoResult<UserRecord> {
        let found: Option<UserRecord> = self.base.db().select(id.clone()).await?;
        found.ok_or_else(|| RepoError::NotFound("User not found".to_string()))
    }

    pub async fn list(&self, params: &ListParams) -> RepoResult<Page<UserRecord>> {
        ListQuery::new(USER_TABLE)
            .search_prefix("name", &params.search)
            .order_by("name", params.direction())
            .page(params.page, params.limit)
            .run(self.base.db())
            .await
    }

    /// `{id, name}` rows for the given ids, for order listings
    pub async fn briefs_for(&self, ids: Vec<RecordId>) -> RepoResult<Vec<CustomerBrief>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut response = self
            .base
            .db()
            .query(format!(
                "SELECT <string>id AS id, name FROM {USER_TABLE} WHERE id IN $ids"
            ))
            .bind(("ids", ids))
            .await?;
        Ok(response.take(0)?)
    }
}
