use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storefront_common::models::notice::Notice;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NoticeRow {
    pub id: i64,
    pub title: String,
    pub details: String,
    pub time: DateTime<Utc>,
}

impl From<NoticeRow> for Notice {
    fn from(row: NoticeRow) -> Self {
        Notice {
            id: row.id,
            title: row.title,
            details: row.details,
            time: row.time,
        }
    }
}

pub struct NoticeRepo;

impl NoticeRepo {
    pub async fn create(pool: &PgPool, title: &str, details: &str) -> Result<NoticeRow> {
        let row = sqlx::query_as::<_, NoticeRow>(
            "INSERT INTO notice (title, details) VALUES ($1, $2) RETURNING id, title, details, time",
        )
        .bind(title)
        .bind(details)
        .fetch_one(pool)
        .await
        .context("Failed to create notice")?;
        Ok(row)
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<NoticeRow>> {
        let row = sqlx::query_as::<_, NoticeRow>(
            "SELECT id, title, details, time FROM notice WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get notice")?;
        Ok(row)
    }

    /// All notices, newest id first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<NoticeRow>> {
        let rows = sqlx::query_as::<_, NoticeRow>(
            "SELECT id, title, details, time FROM notice ORDER BY id DESC",
        )
        .fetch_all(pool)
        .await
        .context("Failed to list notices")?;
        Ok(rows)
    }

    /// Replace title and details and refresh the timestamp
    pub async fn update(
        pool: &PgPool,
        id: i64,
        title: &str,
        details: &str,
    ) -> Result<Option<NoticeRow>> {
        let row = sqlx::query_as::<_, NoticeRow>(
            r#"
            UPDATE notice SET title = $2, details = $3, time = NOW()
            WHERE id = $1
            RETURNING id, title, details, time
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(details)
        .fetch_optional(pool)
        .await
        .context("Failed to update notice")?;
        Ok(row)
    }

    /// Returns false if no notice had that id
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notice WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to delete notice")?;
        Ok(result.rows_affected() > 0)
    }
}
