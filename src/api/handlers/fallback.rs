use crate::error::AppError;

/// Unmatched routes. Only reachable with a valid token; anonymous callers are stopped
/// by the access gate's default deny first.
pub async fn not_found() -> AppError {
    AppError::not_found("route")
}
