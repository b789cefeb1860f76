use anyhow::{Context, Result};
use sqlx::PgPool;
use storefront_common::models::product::{Price, Product};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub category: Option<String>,
    pub pnum: i32,
    pub imgurl: Option<String>,
    pub description: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: Price::from_cents(row.price_cents),
            category: row.category,
            pnum: row.pnum,
            imgurl: row.imgurl,
            description: row.description,
        }
    }
}

pub struct NewProduct<'a> {
    pub name: &'a str,
    pub price: Price,
    pub category: Option<&'a str>,
    pub pnum: i32,
    pub imgurl: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// Result of deleting a product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Still referenced by an order item
    InUse,
}

pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product under a freshly generated `product-<uuid>` id
    pub async fn create(pool: &PgPool, product: &NewProduct<'_>) -> Result<ProductRow> {
        let id = format!("product-{}", Uuid::new_v4());
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO product (id, name, price_cents, category, pnum, imgurl, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, price_cents, category, pnum, imgurl, description
            "#,
        )
        .bind(&id)
        .bind(product.name)
        .bind(product.price.cents())
        .bind(product.category)
        .bind(product.pnum)
        .bind(product.imgurl)
        .bind(product.description)
        .fetch_one(pool)
        .await
        .context("Failed to create product")?;
        Ok(row)
    }

    pub async fn get(pool: &PgPool, id: &str) -> Result<Option<ProductRow>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price_cents, category, pnum, imgurl, description FROM product WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get product")?;
        Ok(row)
    }

    /// List products with optional filters.
    ///
    /// `pattern` (see [`crate::search::contains_pattern`]) matches name, category
    /// or description; `category` must match exactly.
    pub async fn list(
        pool: &PgPool,
        pattern: Option<&str>,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price_cents, category, pnum, imgurl, description
            FROM product
            WHERE ($1::TEXT IS NULL
                   OR name ILIKE $1 ESCAPE '\'
                   OR category ILIKE $1 ESCAPE '\'
                   OR description ILIKE $1 ESCAPE '\')
              AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY name, id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(pattern)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list products")?;
        Ok(rows)
    }

    /// Count products (mirrors `list()`)
    pub async fn count(pool: &PgPool, pattern: Option<&str>, category: Option<&str>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM product
            WHERE ($1::TEXT IS NULL
                   OR name ILIKE $1 ESCAPE '\'
                   OR category ILIKE $1 ESCAPE '\'
                   OR description ILIKE $1 ESCAPE '\')
              AND ($2::TEXT IS NULL OR category = $2)
            "#,
        )
        .bind(pattern)
        .bind(category)
        .fetch_one(pool)
        .await
        .context("Failed to count products")?;
        Ok(count.0)
    }

    /// Best-stocked products first
    pub async fn list_hot(pool: &PgPool, limit: i64) -> Result<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price_cents, category, pnum, imgurl, description
            FROM product
            ORDER BY pnum DESC, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to list hot products")?;
        Ok(rows)
    }

    /// Replace name, price, category and stock. Image and description are only
    /// changed when given.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        product: &NewProduct<'_>,
    ) -> Result<Option<ProductRow>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE product SET
                name = $2,
                price_cents = $3,
                category = $4,
                pnum = $5,
                imgurl = COALESCE($6, imgurl),
                description = COALESCE($7, description)
            WHERE id = $1
            RETURNING id, name, price_cents, category, pnum, imgurl, description
            "#,
        )
        .bind(id)
        .bind(product.name)
        .bind(product.price.cents())
        .bind(product.category)
        .bind(product.pnum)
        .bind(product.imgurl)
        .bind(product.description)
        .fetch_optional(pool)
        .await
        .context("Failed to update product")?;
        Ok(row)
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<DeleteOutcome> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await;
        match result {
            Ok(r) if r.rows_affected() > 0 => Ok(DeleteOutcome::Deleted),
            Ok(_) => Ok(DeleteOutcome::NotFound),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Ok(DeleteOutcome::InUse)
            }
            Err(e) => Err(e).context("Failed to delete product"),
        }
    }
}
