use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storefront_common::models::auth::Role;
use storefront_common::models::user::{User, STATE_ENABLED};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub gender: Option<String>,
    pub telephone: Option<String>,
    pub introduce: Option<String>,
    pub role: String,
    pub state: i16,
    pub regist_time: DateTime<Utc>,
}

impl UserRow {
    /// `None` when the stored role is not a recognised one
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    pub fn is_enabled(&self) -> bool {
        self.state == STATE_ENABLED
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            gender: row.gender,
            telephone: row.telephone,
            introduce: row.introduce,
            role: row.role,
            state: row.state,
            regist_time: row.regist_time,
        }
    }
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub email: &'a str,
    pub gender: Option<&'a str>,
    pub telephone: Option<&'a str>,
    pub introduce: Option<&'a str>,
    pub role: Role,
}

/// Fields left as `None` keep their stored value
#[derive(Debug, Default)]
pub struct ProfileUpdate<'a> {
    pub email: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub telephone: Option<&'a str>,
    pub introduce: Option<&'a str>,
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a user. Returns `None` if the username is already taken.
    pub async fn create(pool: &PgPool, user: &NewUser<'_>) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO "user" (username, password_hash, email, gender, telephone, introduce, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, email, gender, telephone, introduce, role, state, regist_time
            "#,
        )
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.email)
        .bind(user.gender)
        .bind(user.telephone)
        .bind(user.introduce)
        .bind(user.role.as_str())
        .fetch_optional(pool)
        .await
        .context("Failed to create user")?;
        Ok(row)
    }

    pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, username, password_hash, email, gender, telephone, introduce, role, state, regist_time FROM "user" WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by id")?;
        Ok(row)
    }

    pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, username, password_hash, email, gender, telephone, introduce, role, state, regist_time FROM "user" WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;
        Ok(row)
    }

    pub async fn exists_by_username(pool: &PgPool, username: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM "user" WHERE username = $1)"#)
                .bind(username)
                .fetch_one(pool)
                .await
                .context("Failed to check username")?;
        Ok(exists.0)
    }

    pub async fn update_profile(
        pool: &PgPool,
        id: i64,
        update: &ProfileUpdate<'_>,
    ) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE "user" SET
                email = COALESCE($2, email),
                gender = COALESCE($3, gender),
                telephone = COALESCE($4, telephone),
                introduce = COALESCE($5, introduce)
            WHERE id = $1
            RETURNING id, username, password_hash, email, gender, telephone, introduce, role, state, regist_time
            "#,
        )
        .bind(id)
        .bind(update.email)
        .bind(update.gender)
        .bind(update.telephone)
        .bind(update.introduce)
        .fetch_optional(pool)
        .await
        .context("Failed to update user profile")?;
        Ok(row)
    }

    pub async fn update_role(pool: &PgPool, id: i64, role: Role) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE "user" SET role = $2 WHERE id = $1
            RETURNING id, username, password_hash, email, gender, telephone, introduce, role, state, regist_time
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(pool)
        .await
        .context("Failed to update user role")?;
        Ok(row)
    }

    pub async fn update_state(pool: &PgPool, id: i64, state: i16) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE "user" SET state = $2 WHERE id = $1
            RETURNING id, username, password_hash, email, gender, telephone, introduce, role, state, regist_time
            "#,
        )
        .bind(id)
        .bind(state)
        .fetch_optional(pool)
        .await
        .context("Failed to update user state")?;
        Ok(row)
    }

    /// List users, newest first. `pattern` (see [`crate::search::contains_pattern`])
    /// matches username or email.
    pub async fn list(
        pool: &PgPool,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, email, gender, telephone, introduce, role, state, regist_time
            FROM "user"
            WHERE $1::TEXT IS NULL OR username ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\'
            ORDER BY regist_time DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;
        Ok(rows)
    }

    /// Count users (mirrors `list()`)
    pub async fn count(pool: &PgPool, pattern: Option<&str>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM "user"
            WHERE $1::TEXT IS NULL OR username ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\'
            "#,
        )
        .bind(pattern)
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
        Ok(count.0)
    }
}
