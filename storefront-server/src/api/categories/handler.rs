//! Category API handlers

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;

use shared::models::{Category, CategoryName, Pagination, UserRole};

use crate::auth::{CurrentUser, authorize};
use crate::core::ServerState;
use crate::db::models::CategoryRecord;
use crate::db::repository::category::{NewCategory, UpdateCategory};
use crate::db::repository::parse_record_id;
use crate::db::CATEGORY_TABLE;
use crate::services::remove_quietly;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SLUG_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ListParams, ok, ok_paged};

fn view(state: &ServerState, record: CategoryRecord) -> Category {
    let url = state.media.url_for(&record.image);
    record.into_view(url)
}

/// Multipart form shared by create and update
#[derive(Default)]
struct CategoryForm {
    name: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    parent_id: Option<String>,
    image: Option<Vec<u8>>,
}

impl CategoryForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            match field.name() {
                Some("name") => form.name = Some(field.text().await?),
                Some("slug") => form.slug = Some(field.text().await?),
                Some("description") => form.description = Some(field.text().await?),
                Some("parentId") => form.parent_id = Some(field.text().await?),
                Some("image") => form.image = Some(field.bytes().await?.to_vec()),
                _ => {}
            }
        }
        form.validate()?;
        Ok(form)
    }

    fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        if let Some(slug) = &self.slug {
            validate_required_text(slug, "slug", MAX_SLUG_LEN)?;
        }
        validate_optional_text(&self.description, "description", MAX_NOTE_LEN)?;
        Ok(())
    }

    /// `parentId` as a tri-state: absent keeps, empty clears, a value sets
    fn parent_change(&self) -> AppResult<Option<Option<surrealdb::RecordId>>> {
        match self.parent_id.as_deref() {
            None => Ok(None),
            Some("") => Ok(Some(None)),
            Some(id) => Ok(Some(Some(parse_record_id(id, CATEGORY_TABLE)?))),
        }
    }
}

/// GET /category
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let parent = params
        .parent_id
        .as_deref()
        .map(|id| parse_record_id(id, CATEGORY_TABLE))
        .transpose()?;
    let page = state.categories.list(&params, parent).await?;

    let pagination = Pagination::new(page.total, params.page, params.limit);
    let categories = page
        .items
        .into_iter()
        .map(|record| view(&state, record))
        .collect();
    Ok(ok_paged(
        categories,
        pagination,
        "Categories fetched successfully",
    ))
}

/// GET /category/names - privileged `{id, name}` projection
pub async fn names(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<CategoryName>>>> {
    authorize(&user, &[UserRole::Admin])?;
    let names = state.categories.names().await?;
    Ok(ok(names, "Category names fetched successfully"))
}

/// POST /category - privileged, multipart with required `image`
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Category>>> {
    authorize(&user, &[UserRole::Admin])?;
    let form = CategoryForm::read(multipart).await?;

    let name = form
        .name
        .clone()
        .ok_or_else(|| AppError::validation("name is required"))?;
    let slug = form
        .slug
        .clone()
        .ok_or_else(|| AppError::validation("slug is required"))?;
    let image_bytes = form
        .image
        .as_deref()
        .ok_or_else(|| AppError::validation("image is required"))?;
    let parent_category = form.parent_change()?.flatten();

    let image = state.media.store(image_bytes).await?;
    let created = state
        .categories
        .create(NewCategory {
            name,
            slug,
            description: form.description,
            image: image.clone(),
            parent_category,
        })
        .await;

    match created {
        Ok(record) => Ok(ok(view(&state, record), "Category created successfully")),
        Err(e) => {
            // The row never landed, so the blob is unreferenced
            remove_quietly(state.media.as_ref(), &image).await;
            Err(e.into())
        }
    }
}

/// PUT /category/{id} - privileged; a new image replaces the old one
/// only after it is durably stored
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Category>>> {
    authorize(&user, &[UserRole::Admin])?;
    let record_id = parse_record_id(&id, CATEGORY_TABLE)?;
    let form = CategoryForm::read(multipart).await?;

    let existing = state.categories.get(&record_id).await?;
    let old_image = existing.image.clone();

    let new_image = match form.image.as_deref() {
        Some(bytes) => Some(state.media.store(bytes).await?),
        None => None,
    };
    let replaced = new_image.is_some();

    let updated = state
        .categories
        .update(
            &record_id,
            UpdateCategory {
                name: form.name.clone(),
                slug: form.slug.clone(),
                description: form.description.clone(),
                image: new_image.clone(),
                parent_category: form.parent_change()?,
            },
        )
        .await;
    let updated = match updated {
        Ok(record) => record,
        Err(e) => {
            if let Some(image) = &new_image {
                remove_quietly(state.media.as_ref(), image).await;
            }
            return Err(e.into());
        }
    };

    if replaced {
        remove_quietly(state.media.as_ref(), &old_image).await;
    }
    Ok(ok(
        view(&state, updated),
        "Category updated successfully",
    ))
}

/// DELETE /category/{id} - privileged; children are re-parented to the
/// root, then the image blob is removed last
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Category>>> {
    authorize(&user, &[UserRole::Admin])?;
    let record_id = parse_record_id(&id, CATEGORY_TABLE)?;

    let deleted = state.categories.delete(&record_id).await?;
    remove_quietly(state.media.as_ref(), &deleted.image).await;
    Ok(ok(
        view(&state, deleted),
        "Category deleted successfully",
    ))
}
