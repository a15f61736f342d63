//! Route access gate: classify → authenticate → authorize, then hand a `RequestIdentity`
//! to the handler through request extensions.
//!
//! - Classification comes from the `AccessPolicy` table in state; no handler declares its own rule.
//! - Public routes never look at the `Authorization` header, so a stale token cannot break them.
//! - Every rejection reason is logged here. Clients only see a uniform 401 or 403.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::api::extractors::RequestIdentity;
use crate::error::AppError;
use crate::services::auth::{Access, AuthError, Identity};
use crate::state::AppState;

/// Put the access gate in front of every route of `router`, including its fallback.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let rule = state.policy.matching_rule(&method, &path);
    let access = rule.map_or(Access::Authenticated, |r| r.access());

    let identity = authenticate(access, rule.is_some(), req.headers(), |token| {
        state.auth.verify_token(token, Utc::now())
    })
    .and_then(|identity| authorize(access, &identity).map(|()| identity))
    .map_err(|reason| reject(reason, &method, &path))?;

    if let Some(id) = identity.identity() {
        debug!(%method, path = %path, user_id = %id.user_id(), "request authenticated");
    }

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

fn reject(reason: AuthError, method: &Method, path: &str) -> AppError {
    match reason {
        // routine for anonymous browsing; not worth a warning
        AuthError::MissingCredential | AuthError::UnknownRoute => {
            debug!(%reason, %method, path, "request rejected");
        }
        _ => {
            warn!(%reason, %method, path, "request rejected");
        }
    }
    reason.into()
}

/// Pull the bearer token out of `Authorization`.
///
/// - no header, or a non-Bearer scheme: `Ok(None)`
/// - `Bearer` with nothing after it, or a header that is not visible ASCII: `MalformedToken`
///
/// The scheme name is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(raw) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = raw.to_str().map_err(|_| AuthError::MalformedToken)?.trim();

    let (scheme, rest) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    Ok(Some(token))
}

/// Establish who is calling.
///
/// `matched` tells a default-deny miss apart from a declared protected route, for logging.
pub fn authenticate<F>(
    access: Access,
    matched: bool,
    headers: &HeaderMap,
    verify: F,
) -> Result<RequestIdentity, AuthError>
where
    F: FnOnce(&str) -> Result<Identity, AuthError>,
{
    if access == Access::Public {
        return Ok(RequestIdentity::Anonymous);
    }

    let missing = if matched {
        AuthError::MissingCredential
    } else {
        AuthError::UnknownRoute
    };
    let token = bearer_token(headers)?.ok_or(missing)?;

    verify(token).map(RequestIdentity::Authenticated)
}

/// Decide whether the established identity may proceed.
pub fn authorize(access: Access, identity: &RequestIdentity) -> Result<(), AuthError> {
    match access {
        Access::Public => Ok(()),
        Access::Authenticated => identity
            .identity()
            .map(|_| ())
            .ok_or(AuthError::MissingCredential),
        Access::Role(role) => {
            let id = identity.identity().ok_or(AuthError::MissingCredential)?;
            if id.has_role(role) {
                Ok(())
            } else {
                Err(AuthError::RoleMismatch)
            }
        }
    }
}
