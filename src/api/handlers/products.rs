/*
 * Responsibility
 * - /api/products handlers (thin pass-through to ProductStore)
 * - search takes its filter as a JSON body
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::dto::catalog::ProductRequest,
    error::AppError,
    services::catalog::{Product, ProductFilter},
    state::AppState,
};

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.products.list().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    state
        .products
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::not_found("product"))
}

pub async fn search_products(
    State(state): State<AppState>,
    Json(filter): Json<ProductFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    if let (Some(min), Some(max)) = (filter.min_price_cents, filter.max_price_cents)
        && min > max
    {
        return Err(AppError::invalid_request(
            "min_price_cents must be <= max_price_cents",
        ));
    }

    Ok(Json(state.products.search(&filter).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    let product = state.products.create(req.into_input()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    state
        .products
        .update(id, req.into_input())
        .await?
        .map(Json)
        .ok_or(AppError::not_found("product"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.products.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("product"))
    }
}
