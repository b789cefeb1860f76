use crate::auth::{create_access_token, hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::web::api::extract::ValidJson;
use axum::extract::State;
use std::sync::Arc;
use storefront_common::models::auth::{AuthResponse, LoginRequest, RegisterRequest, Role};
use storefront_db::{NewUser, UserRepo, UserRow};

fn issue(state: &AppState, user: UserRow) -> ApiResult<AuthResponse> {
    let auth = &state.config.auth;
    let token = create_access_token(&user, &auth.jwt_secret, auth.token_ttl_secs)?;
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// POST /api/auth/register - create a customer account and sign it in
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<ApiResponse<AuthResponse>> {
    let username = req.username.as_str();
    if UserRepo::exists_by_username(&state.pool, username).await? {
        return Err(ApiError::conflict("Username already exists"));
    }

    let password_hash = hash_password(&req.password)?;
    let user = UserRepo::create(
        &state.pool,
        &NewUser {
            username,
            password_hash: &password_hash,
            email: &req.email,
            gender: req.gender.as_deref(),
            telephone: req.telephone.as_deref(),
            introduce: req.introduce.as_deref(),
            role: Role::Customer,
        },
    )
    .await?
    // Lost a race with a concurrent registration of the same name
    .ok_or_else(|| ApiError::conflict("Username already exists"))?;

    tracing::info!("Registered user '{}' (id {})", user.username, user.id);
    Ok(ApiResponse::with_message(
        "Registration successful",
        issue(&state, user)?,
    ))
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<ApiResponse<AuthResponse>> {
    let invalid = || ApiError::unauthorized("Invalid username or password");

    let user = UserRepo::get_by_username(&state.pool, &req.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }
    if !user.is_enabled() {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    tracing::debug!("User '{}' logged in", user.username);
    Ok(ApiResponse::with_message("Login successful", issue(&state, user)?))
}
