use crate::auth::hash_password;
use crate::config::InitialAdminConfig;
use anyhow::{Context, Result};
use sqlx::PgPool;
use storefront_common::models::auth::Role;
use storefront_db::{NewUser, UserRepo};

/// Create the configured super admin unless the username is already taken.
/// Returns true if an account was created.
pub async fn seed_initial_admin(pool: &PgPool, admin: &InitialAdminConfig) -> Result<bool> {
    if UserRepo::exists_by_username(pool, &admin.username).await? {
        tracing::info!(
            "Initial admin '{}' already exists, skipping seed",
            admin.username
        );
        return Ok(false);
    }

    let password_hash =
        hash_password(&admin.password).context("Failed to hash initial admin password")?;
    let created = UserRepo::create(
        pool,
        &NewUser {
            username: &admin.username,
            password_hash: &password_hash,
            email: &admin.email,
            gender: None,
            telephone: None,
            introduce: None,
            role: Role::SuperAdmin,
        },
    )
    .await
    .context("Failed to create initial admin")?;

    if created.is_some() {
        tracing::info!("Created initial admin: {}", admin.username);
    }
    Ok(created.is_some())
}
