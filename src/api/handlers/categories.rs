/*
 * Responsibility
 * - /api/categories handlers (thin pass-through to CategoryStore)
 * - Role checks already happened in the access gate
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::dto::catalog::CreateCategoryRequest, error::AppError, services::catalog::Category,
    state::AppState,
};

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.categories.list().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    state
        .categories
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::not_found("category"))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    let category = state.categories.create(req.into_new()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.categories.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("category"))
    }
}
