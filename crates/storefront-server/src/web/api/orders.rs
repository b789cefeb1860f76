use crate::auth::require_role;
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::web::api::extract::{ApiPath, ApiQuery, ListQuery, ValidJson};
use crate::web::api::middleware::{AdminUser, AuthUser};
use axum::extract::State;
use sqlx::PgPool;
use std::sync::Arc;
use storefront_common::models::auth::ADMIN_ROLES;
use storefront_common::models::order::{NewOrderRequest, Order, PAYSTATE_PAID};
use storefront_common::pagination::{Page, PageRequest};
use storefront_db::{assemble_orders, NewOrder, OrderRepo, OrderRow, PlaceOrderOutcome, UserRow};

const DEFAULT_PAGE_SIZE: i64 = 10;

fn not_found() -> ApiError {
    ApiError::not_found("Order not found")
}

/// Attach items and their products to a batch of orders
async fn with_items(pool: &PgPool, rows: Vec<OrderRow>) -> anyhow::Result<Vec<Order>> {
    let ids: Vec<String> = rows.iter().map(|o| o.id.clone()).collect();
    let items = OrderRepo::items_for_orders(pool, &ids).await?;
    Ok(assemble_orders(rows, items))
}

async fn single_with_items(pool: &PgPool, row: OrderRow) -> ApiResult<Order> {
    with_items(pool, vec![row])
        .await?
        .pop()
        .ok_or_else(not_found)
}

fn can_view(user: &UserRow, order: &OrderRow) -> bool {
    order.user_id == user.id || require_role(user, ADMIN_ROLES).is_ok()
}

/// POST /api/orders - reserve stock and record the order in one transaction
#[tracing::instrument(skip(state, user, req), fields(user_id = user.id))]
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ValidJson(req): ValidJson<NewOrderRequest>,
) -> ApiResult<ApiResponse<Order>> {
    let mut items = Vec::with_capacity(req.items.len());
    for (i, item) in req.items.iter().enumerate() {
        let buynum = i32::try_from(item.buynum).map_err(|_| {
            ApiError::invalid_field(format!("items[{i}].buynum"), "buynum is too large")
        })?;
        items.push((item.product_id.as_str(), buynum));
    }

    let outcome = OrderRepo::place(
        &state.pool,
        &NewOrder {
            user_id: user.id,
            receiver_address: &req.receiver_address,
            receiver_name: &req.receiver_name,
            receiver_phone: &req.receiver_phone,
            items,
        },
    )
    .await?;

    let row = match outcome {
        PlaceOrderOutcome::Placed(row) => row,
        PlaceOrderOutcome::UnknownProduct(id) => {
            return Err(ApiError::not_found(format!("Product {} not found", id)))
        }
        PlaceOrderOutcome::OutOfStock {
            product_id,
            available,
        } => {
            return Err(ApiError::invalid_field(
                "items",
                format!(
                    "insufficient stock for product {}: {} available",
                    product_id, available
                ),
            ))
        }
    };

    tracing::info!("Order {} placed, total {}", row.id, row.money_cents);
    let order = single_with_items(&state.pool, row).await?;
    Ok(ApiResponse::with_message("Order placed", order))
}

/// GET /api/orders - the caller's orders, newest first
#[tracing::instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_my_orders(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<ApiResponse<Page<Order>>> {
    let page = PageRequest::new(query.page, query.size, DEFAULT_PAGE_SIZE);
    let rows = OrderRepo::list_by_user(&state.pool, user.id, page.limit(), page.offset()).await?;
    let total = OrderRepo::count_by_user(&state.pool, user.id).await?;
    let orders = with_items(&state.pool, rows).await?;
    Ok(ApiResponse::ok(Page::new(orders, total, page)))
}

/// GET /api/orders/admin - every order, newest first
#[tracing::instrument(skip(state, _admin))]
pub async fn list_all_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<ApiResponse<Page<Order>>> {
    let page = PageRequest::new(query.page, query.size, DEFAULT_PAGE_SIZE);
    let rows = OrderRepo::list(&state.pool, page.limit(), page.offset()).await?;
    let total = OrderRepo::count(&state.pool).await?;
    let orders = with_items(&state.pool, rows).await?;
    Ok(ApiResponse::ok(Page::new(orders, total, page)))
}

/// GET /api/orders/{id} - visible to its owner and to admins
#[tracing::instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<ApiResponse<Order>> {
    let row = OrderRepo::get(&state.pool, &id).await?.ok_or_else(not_found)?;
    if !can_view(&user, &row) {
        return Err(ApiError::forbidden("Not allowed to view this order"));
    }
    Ok(ApiResponse::ok(single_with_items(&state.pool, row).await?))
}

/// PUT /api/orders/{id}/pay - owner marks the order paid; paying twice is fine
#[tracing::instrument(skip(state, user), fields(user_id = user.id))]
pub async fn pay_order(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<ApiResponse<Order>> {
    let row = OrderRepo::get(&state.pool, &id).await?.ok_or_else(not_found)?;
    if row.user_id != user.id {
        return Err(ApiError::forbidden("Not allowed to pay for this order"));
    }

    let row = if row.paystate == PAYSTATE_PAID {
        row
    } else {
        tracing::info!("Order {} paid", id);
        OrderRepo::mark_paid(&state.pool, &id)
            .await?
            .ok_or_else(not_found)?
    };
    Ok(ApiResponse::with_message(
        "Order paid",
        single_with_items(&state.pool, row).await?,
    ))
}
