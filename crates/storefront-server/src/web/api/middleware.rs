use crate::auth::{bearer_token, require_role, validate_access_token};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;
use storefront_common::models::auth::ADMIN_ROLES;
use storefront_db::{UserRepo, UserRow};

/// Extractor that resolves the Bearer token to the user it was issued for.
/// Any handler naming it requires authentication.
#[derive(Debug)]
pub struct AuthUser(pub UserRow);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = match parts.headers.get(header::AUTHORIZATION) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| ApiError::unauthorized("Invalid authorization header format"))?,
            ),
            None => None,
        };

        let token = bearer_token(auth_header)?;
        let claims = validate_access_token(token, &state.config.auth.jwt_secret)?;
        let user_id = claims.user_id().ok_or(ApiError::InvalidToken)?;

        let user = UserRepo::get_by_id(&state.pool, user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        Ok(AuthUser(user))
    }
}

/// Authenticated user holding an admin-capable role; anyone else gets 403.
#[derive(Debug)]
pub struct AdminUser(pub UserRow);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        require_role(&user, ADMIN_ROLES)?;
        Ok(AdminUser(user))
    }
}
