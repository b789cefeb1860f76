use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::web::api::extract::{ApiPath, ValidJson};
use crate::web::api::middleware::AdminUser;
use axum::extract::State;
use std::sync::Arc;
use storefront_common::models::notice::{Notice, NoticeRequest};
use storefront_db::NoticeRepo;

fn not_found() -> ApiError {
    ApiError::not_found("Notice not found")
}

/// GET /api/notices - newest first
#[tracing::instrument(skip(state))]
pub async fn list_notices(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse<Vec<Notice>>> {
    let notices = NoticeRepo::list_all(&state.pool).await?;
    Ok(ApiResponse::ok(notices.into_iter().map(Notice::from).collect()))
}

/// GET /api/notices/{id}
#[tracing::instrument(skip(state))]
pub async fn get_notice(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<Notice>> {
    let notice = NoticeRepo::get(&state.pool, id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::ok(notice.into()))
}

/// POST /api/notices
#[tracing::instrument(skip(state, _admin, req))]
pub async fn create_notice(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidJson(req): ValidJson<NoticeRequest>,
) -> ApiResult<ApiResponse<Notice>> {
    let notice = NoticeRepo::create(&state.pool, &req.title, &req.details).await?;
    tracing::info!("Created notice {}", notice.id);
    Ok(ApiResponse::with_message("Notice created", notice.into()))
}

/// PUT /api/notices/{id}
#[tracing::instrument(skip(state, _admin, req))]
pub async fn update_notice(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<i64>,
    ValidJson(req): ValidJson<NoticeRequest>,
) -> ApiResult<ApiResponse<Notice>> {
    let notice = NoticeRepo::update(&state.pool, id, &req.title, &req.details)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::with_message("Notice updated", notice.into()))
}

/// DELETE /api/notices/{id}
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_notice(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    if !NoticeRepo::delete(&state.pool, id).await? {
        return Err(not_found());
    }
    tracing::info!("Deleted notice {}", id);
    Ok(ApiResponse::message("Notice deleted"))
}
