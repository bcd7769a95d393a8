//! User API handlers

use axum::extract::{Query, State};
use axum::Json;

use shared::models::{Pagination, User, UserRole};

use crate::auth::{CurrentUser, authorize};
use crate::core::ServerState;
use crate::db::models::UserRecord;
use crate::db::repository::parse_record_id;
use crate::db::USER_TABLE;
use crate::utils::{ApiResponse, AppResult, ListParams, ok, ok_paged};

fn view(state: &ServerState, record: UserRecord) -> User {
    let profile_image_url = record
        .profile_image
        .as_deref()
        .map(|f| state.media.url_for(f));
    record.into_view(profile_image_url)
}

/// GET /users - privileged listing
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    authorize(&user, &[UserRole::Admin])?;

    let page = state.users.list(&params).await?;
    let pagination = Pagination::new(page.total, params.page, params.limit);
    let users = page
        .items
        .into_iter()
        .map(|record| view(&state, record))
        .collect();
    Ok(ok_paged(users, pagination, "Users fetched successfully"))
}

/// GET /users/me - the acting identity
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let record_id = parse_record_id(&user.id, USER_TABLE)?;
    let record = state.users.get(&record_id).await?;
    Ok(ok(view(&state, record), "User fetched successfully"))
}
