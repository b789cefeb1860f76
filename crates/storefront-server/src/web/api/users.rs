use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::web::api::extract::{ApiPath, ApiQuery, ListQuery, ValidJson};
use crate::web::api::middleware::{AdminUser, AuthUser};
use axum::extract::State;
use std::sync::Arc;
use storefront_common::models::user::{
    UpdateProfileRequest, UpdateRoleRequest, UpdateStateRequest, User,
};
use storefront_common::pagination::{keyword_filter, Page, PageRequest};
use storefront_db::{contains_pattern, ProfileUpdate, UserRepo};

const DEFAULT_PAGE_SIZE: i64 = 10;

/// GET /api/users/me
#[tracing::instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> ApiResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(user.into()))
}

/// PUT /api/users/me - change only the profile fields present in the body
#[tracing::instrument(skip_all)]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> ApiResult<ApiResponse<User>> {
    let update = ProfileUpdate {
        email: req.email.as_deref(),
        gender: req.gender.as_deref(),
        telephone: req.telephone.as_deref(),
        introduce: req.introduce.as_deref(),
    };
    let updated = UserRepo::update_profile(&state.pool, user.id, &update)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(ApiResponse::with_message("Profile updated", updated.into()))
}

/// GET /api/users/admin - page through users, newest registration first
#[tracing::instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<ApiResponse<Page<User>>> {
    let page = PageRequest::new(query.page, query.size, DEFAULT_PAGE_SIZE);
    let pattern = keyword_filter(query.keyword.as_deref()).map(contains_pattern);

    let rows = UserRepo::list(
        &state.pool,
        pattern.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    let total = UserRepo::count(&state.pool, pattern.as_deref()).await?;

    Ok(ApiResponse::ok(
        Page::new(rows, total, page).map(User::from),
    ))
}

/// PUT /api/users/admin/{id}/role
#[tracing::instrument(skip(state, admin, req), fields(admin = %admin.0.username))]
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ApiPath(id): ApiPath<i64>,
    ValidJson(req): ValidJson<UpdateRoleRequest>,
) -> ApiResult<ApiResponse<User>> {
    let role = req
        .role()
        .ok_or_else(|| ApiError::invalid_field("role", "unknown role"))?;
    let updated = UserRepo::update_role(&state.pool, id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!("User {} role set to {}", id, role);
    Ok(ApiResponse::with_message("Role updated", updated.into()))
}

/// PUT /api/users/admin/{id}/state - enable (1) or disable (0) an account
#[tracing::instrument(skip(state, admin, req), fields(admin = %admin.0.username))]
pub async fn update_state(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    ApiPath(id): ApiPath<i64>,
    ValidJson(req): ValidJson<UpdateStateRequest>,
) -> ApiResult<ApiResponse<User>> {
    let state_value = req
        .state()
        .ok_or_else(|| ApiError::invalid_field("state", "state must be 0 or 1"))?;
    let updated = UserRepo::update_state(&state.pool, id, state_value)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!("User {} state set to {}", id, state_value);
    Ok(ApiResponse::with_message("State updated", updated.into()))
}
