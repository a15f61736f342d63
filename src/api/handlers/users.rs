/*
 * Responsibility
 * - GET /api/users/profile: echo the verified identity back to the caller
 */
use axum::Json;

use crate::api::{dto::users::ProfileResponse, extractors::CurrentUser};

pub async fn profile(CurrentUser(identity): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(&identity))
}
