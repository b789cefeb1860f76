use crate::error::ApiError;
use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use storefront_common::models::auth::{Claims, Role};
use storefront_db::UserRow;

/// Hash a password using argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Sign a set of claims with HS256
pub fn sign_claims(claims: &Claims, jwt_secret: &str) -> Result<String> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .context("Failed to sign token")
}

/// Create an access token (JWT) for a user, valid for `ttl_secs`
pub fn create_access_token(user: &UserRow, jwt_secret: &str, ttl_secs: i64) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role.clone(),
        iat: now,
        exp: now + ttl_secs,
    };
    sign_claims(&claims, jwt_secret)
}

/// Validate an access token and return its claims.
///
/// Expired tokens fail with `ExpiredToken`; anything else that does not verify,
/// including a subject that is not a user id, fails with `InvalidToken`.
pub fn validate_access_token(token: &str, jwt_secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let claims = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::ExpiredToken,
        _ => ApiError::InvalidToken,
    })?
    .claims;

    if claims.user_id().is_none() {
        return Err(ApiError::InvalidToken);
    }
    Ok(claims)
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, ApiError> {
    let value = header.ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization header format"))
}

/// Fail with `Forbidden` unless the user's role is one of `allowed`.
/// An unrecognised stored role never passes.
pub fn require_role(user: &UserRow, allowed: &[Role]) -> Result<(), ApiError> {
    match user.role() {
        Some(role) if allowed.contains(&role) => Ok(()),
        _ => Err(ApiError::forbidden("Insufficient permissions")),
    }
}
