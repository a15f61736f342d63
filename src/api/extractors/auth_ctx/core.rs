use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Identity;
use crate::state::AppState;

use super::RequestIdentity;

/// Extractor handing the verified identity to a handler.
///
/// Relies on the access gate having inserted `RequestIdentity` into the extensions.
/// Missing or anonymous context is a 401 (route is public or the gate is not wired).
pub struct CurrentUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .and_then(RequestIdentity::identity)
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
