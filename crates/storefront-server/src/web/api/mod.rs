pub mod auth;
pub mod extract;
pub mod middleware;
pub mod notices;
pub mod orders;
pub mod products;
pub mod users;

use crate::state::AppState;
use axum::response::IntoResponse;
use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// GET /api/health -- public liveness probe
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Current user and user administration
        .route("/users/me", get(users::get_me).put(users::update_me))
        .route("/users/admin", get(users::list_users))
        .route("/users/admin/{id}/role", put(users::update_role))
        .route("/users/admin/{id}/state", put(users::update_state))
        // Notices
        .route(
            "/notices",
            get(notices::list_notices).post(notices::create_notice),
        )
        .route(
            "/notices/{id}",
            get(notices::get_notice)
                .put(notices::update_notice)
                .delete(notices::delete_notice),
        )
        // Products
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/hot", get(products::hot_products))
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // Orders
        .route(
            "/orders",
            get(orders::list_my_orders).post(orders::place_order),
        )
        .route("/orders/admin", get(orders::list_all_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/pay", put(orders::pay_order))
        .with_state(state)
}
