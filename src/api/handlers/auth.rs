/*
 * Responsibility
 * - POST /api/auth/login, POST /api/auth/register
 * - Body shape checks here; credential checks and token issuance in AuthService
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::dto::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    error::AppError,
    state::AppState,
};

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    let outcome = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token: outcome.issued.token,
        token_type: "Bearer",
        expires_in: outcome.issued.expires_in,
        username: outcome.identity.login_id().to_string(),
        roles: outcome.identity.roles().iter().copied().collect(),
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    let identity = state.auth.register(&req.email, &req.password).await?;
    tracing::info!(user_id = %identity.user_id(), "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: identity.user_id(),
            username: identity.login_id().to_string(),
            roles: identity.roles().iter().copied().collect(),
        }),
    ))
}
