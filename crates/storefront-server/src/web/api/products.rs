use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::web::api::extract::{ApiPath, ApiQuery, ListQuery, ValidJson};
use crate::web::api::middleware::AdminUser;
use axum::extract::State;
use std::sync::Arc;
use storefront_common::models::product::{Product, ProductRequest};
use storefront_common::pagination::{keyword_filter, Page, PageRequest};
use storefront_db::{contains_pattern, DeleteOutcome, NewProduct, ProductRepo};

const DEFAULT_PAGE_SIZE: i64 = 12;
const HOT_PRODUCTS: i64 = 10;

fn not_found() -> ApiError {
    ApiError::not_found("Product not found")
}

/// Borrow a validated request as a row to write
fn to_new_product(req: &ProductRequest) -> ApiResult<NewProduct<'_>> {
    let price = req
        .price()
        .ok_or_else(|| ApiError::invalid_field("price", "price must be at least 0.01"))?;
    Ok(NewProduct {
        name: &req.name,
        price,
        category: req.category.as_deref(),
        pnum: req.pnum(),
        imgurl: req.imgurl.as_deref(),
        description: req.description.as_deref(),
    })
}

/// GET /api/products
///
/// A non-blank `keyword` searches name, category and description; otherwise a
/// non-blank `category` filters exactly; otherwise everything is listed.
#[tracing::instrument(skip(state))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<ApiResponse<Page<Product>>> {
    let page = PageRequest::new(query.page, query.size, DEFAULT_PAGE_SIZE);
    let pattern = keyword_filter(query.keyword.as_deref()).map(contains_pattern);
    let category = match pattern {
        Some(_) => None,
        None => keyword_filter(query.category.as_deref()),
    };

    let rows = ProductRepo::list(
        &state.pool,
        pattern.as_deref(),
        category,
        page.limit(),
        page.offset(),
    )
    .await?;
    let total = ProductRepo::count(&state.pool, pattern.as_deref(), category).await?;

    Ok(ApiResponse::ok(
        Page::new(rows, total, page).map(Product::from),
    ))
}

/// GET /api/products/hot
#[tracing::instrument(skip(state))]
pub async fn hot_products(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ApiResponse<Vec<Product>>> {
    let rows = ProductRepo::list_hot(&state.pool, HOT_PRODUCTS).await?;
    Ok(ApiResponse::ok(rows.into_iter().map(Product::from).collect()))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<ApiResponse<Product>> {
    let row = ProductRepo::get(&state.pool, &id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::ok(row.into()))
}

/// POST /api/products
#[tracing::instrument(skip(state, _admin, req))]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidJson(req): ValidJson<ProductRequest>,
) -> ApiResult<ApiResponse<Product>> {
    let row = ProductRepo::create(&state.pool, &to_new_product(&req)?).await?;
    tracing::info!("Created product {} ({})", row.id, row.name);
    Ok(ApiResponse::with_message("Product created", row.into()))
}

/// PUT /api/products/{id}
#[tracing::instrument(skip(state, _admin, req))]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<String>,
    ValidJson(req): ValidJson<ProductRequest>,
) -> ApiResult<ApiResponse<Product>> {
    let row = ProductRepo::update(&state.pool, &id, &to_new_product(&req)?)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::with_message("Product updated", row.into()))
}

/// DELETE /api/products/{id}
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<ApiResponse<()>> {
    match ProductRepo::delete(&state.pool, &id).await? {
        DeleteOutcome::Deleted => {
            tracing::info!("Deleted product {}", id);
            Ok(ApiResponse::message("Product deleted"))
        }
        DeleteOutcome::NotFound => Err(not_found()),
        DeleteOutcome::InUse => Err(ApiError::conflict(
            "Product is referenced by an order and cannot be deleted",
        )),
    }
}
