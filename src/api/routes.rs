/*
 * Responsibility
 * - URL structure under /api
 * - No access rules here: the gate's route table (services::auth::policy) decides who may call what
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    auth::{login, register},
    categories::{create_category, delete_category, get_category, list_categories},
    payments::webhook,
    products::{
        create_product, delete_product, get_product, list_products, search_products,
        update_product,
    },
    users::profile,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", post(search_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).delete(delete_category),
        )
        .route("/users/profile", get(profile))
        .route("/payments/webhook", post(webhook))
}
