//! Product API handlers

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use surrealdb::RecordId;

use shared::models::{CategoryName, Pagination, Product, UserRole};

use crate::auth::{CurrentUser, authorize};
use crate::core::ServerState;
use crate::db::models::ProductRecord;
use crate::db::repository::product::{NewProduct, UpdateProduct};
use crate::db::repository::parse_record_id;
use crate::db::{CATEGORY_TABLE, PRODUCT_TABLE};
use crate::services::remove_quietly;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ListParams, ok, ok_paged};

/// Resolve category names for a batch of products in one query
async fn views_for(state: &ServerState, records: Vec<ProductRecord>) -> AppResult<Vec<Product>> {
    let mut category_ids: Vec<RecordId> =
        records.iter().map(|r| r.category.clone()).collect();
    category_ids.sort_by_key(|id| id.to_string());
    category_ids.dedup();

    let names: HashMap<String, String> = state
        .categories
        .names_for(category_ids)
        .await?
        .into_iter()
        .map(|n| (n.id, n.name))
        .collect();

    Ok(records
        .into_iter()
        .map(|record| {
            let category_id = record.category.to_string();
            let category = CategoryName {
                name: names.get(&category_id).cloned().unwrap_or_default(),
                id: category_id,
            };
            let urls = record
                .images
                .iter()
                .map(|f| state.media.url_for(f))
                .collect();
            record.into_view(urls, category)
        })
        .collect())
}

async fn view(state: &ServerState, record: ProductRecord) -> AppResult<Product> {
    let mut views = views_for(state, vec![record]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::internal("product view resolution lost the row"))
}

#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    stock: Option<i64>,
    category_id: Option<String>,
    images: Vec<Vec<u8>>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            match field.name() {
                Some("name") => form.name = Some(field.text().await?),
                Some("description") => form.description = Some(field.text().await?),
                Some("price") => {
                    let raw = field.text().await?;
                    let price = Decimal::from_str(raw.trim())
                        .map_err(|_| AppError::validation("price must be a decimal number"))?;
                    if price < Decimal::ZERO {
                        return Err(AppError::validation("price must not be negative"));
                    }
                    form.price = Some(price);
                }
                Some("stock") => {
                    let raw = field.text().await?;
                    let stock: i64 = raw
                        .trim()
                        .parse()
                        .map_err(|_| AppError::validation("stock must be an integer"))?;
                    if stock < 0 {
                        return Err(AppError::validation("stock must not be negative"));
                    }
                    form.stock = Some(stock);
                }
                Some("categoryId") => form.category_id = Some(field.text().await?),
                Some("images") => form.images.push(field.bytes().await?.to_vec()),
                _ => {}
            }
        }
        if let Some(name) = &form.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        if let Some(description) = &form.description {
            validate_required_text(description, "description", MAX_NOTE_LEN)?;
        }
        Ok(form)
    }

    fn category(&self) -> AppResult<Option<RecordId>> {
        self.category_id
            .as_deref()
            .map(|id| parse_record_id(id, CATEGORY_TABLE).map_err(AppError::from))
            .transpose()
    }
}

/// Store every upload; on any failure, already stored files are removed
async fn store_all(state: &ServerState, uploads: &[Vec<u8>]) -> AppResult<Vec<String>> {
    let mut stored = Vec::with_capacity(uploads.len());
    for data in uploads {
        match state.media.store(data).await {
            Ok(filename) => stored.push(filename),
            Err(e) => {
                for filename in &stored {
                    remove_quietly(state.media.as_ref(), filename).await;
                }
                return Err(e.into());
            }
        }
    }
    Ok(stored)
}

/// GET /product
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let page = state.products.list(&params, None).await?;
    let pagination = Pagination::new(page.total, params.page, params.limit);
    let products = views_for(&state, page.items).await?;
    Ok(ok_paged(products, pagination, "Products fetched successfully"))
}

/// GET /product/{id}
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let record_id = parse_record_id(&id, PRODUCT_TABLE)?;
    let record = state.products.get(&record_id).await?;
    Ok(ok(view(&state, record).await?, "Product fetched successfully"))
}

/// GET /product/category/{id} - listing scoped to one category; the
/// category itself must exist
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let category_id = parse_record_id(&id, CATEGORY_TABLE)?;
    state.categories.get(&category_id).await?;

    let page = state.products.list(&params, Some(category_id)).await?;
    let pagination = Pagination::new(page.total, params.page, params.limit);
    let products = views_for(&state, page.items).await?;
    Ok(ok_paged(products, pagination, "Products fetched successfully"))
}

/// POST /product - privileged, multipart with at least one `images`
/// field
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    authorize(&user, &[UserRole::Admin])?;
    let form = ProductForm::read(multipart).await?;

    let name = form
        .name
        .clone()
        .ok_or_else(|| AppError::validation("name is required"))?;
    let description = form
        .description
        .clone()
        .ok_or_else(|| AppError::validation("description is required"))?;
    let price = form
        .price
        .ok_or_else(|| AppError::validation("price is required"))?;
    let stock = form
        .stock
        .ok_or_else(|| AppError::validation("stock is required"))?;
    let category = form
        .category()?
        .ok_or_else(|| AppError::validation("categoryId is required"))?;
    if form.images.is_empty() {
        return Err(AppError::validation("at least one image is required"));
    }

    let images = store_all(&state, &form.images).await?;
    let created = state
        .products
        .create(NewProduct {
            name,
            description,
            price,
            stock,
            images: images.clone(),
            category,
        })
        .await;

    match created {
        Ok(record) => Ok(ok(
            view(&state, record).await?,
            "Product created successfully",
        )),
        Err(e) => {
            for filename in &images {
                remove_quietly(state.media.as_ref(), filename).await;
            }
            Err(e.into())
        }
    }
}

/// PUT /product/{id} - privileged; new images replace the old set only
/// after all of them are stored
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    authorize(&user, &[UserRole::Admin])?;
    let record_id = parse_record_id(&id, PRODUCT_TABLE)?;
    let form = ProductForm::read(multipart).await?;

    let existing = state.products.get(&record_id).await?;
    let old_images = existing.images.clone();

    let new_images = if form.images.is_empty() {
        None
    } else {
        Some(store_all(&state, &form.images).await?)
    };
    let replaced = new_images.is_some();

    let updated = state
        .products
        .update(
            &record_id,
            UpdateProduct {
                name: form.name.clone(),
                description: form.description.clone(),
                price: form.price,
                stock: form.stock,
                images: new_images.clone(),
                category: form.category()?,
            },
        )
        .await;
    let updated = match updated {
        Ok(record) => record,
        Err(e) => {
            for filename in new_images.iter().flatten() {
                remove_quietly(state.media.as_ref(), filename).await;
            }
            return Err(e.into());
        }
    };

    if replaced {
        for filename in &old_images {
            remove_quietly(state.media.as_ref(), filename).await;
        }
    }
    Ok(ok(
        view(&state, updated).await?,
        "Product updated successfully",
    ))
}

/// DELETE /product/{id} - privileged; removes every image blob after
/// the row is gone
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    authorize(&user, &[UserRole::Admin])?;
    let record_id = parse_record_id(&id, PRODUCT_TABLE)?;

    let deleted = state.products.delete(&record_id).await?;
    for filename in &deleted.images {
        remove_quietly(state.media.as_ref(), filename).await;
    }
    Ok(ok(
        view(&state, deleted).await?,
        "Product deleted successfully",
    ))
}
