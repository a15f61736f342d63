//! CORS policy for browser clients.
//!
//! Note:
//! - CORS is enforced by browsers. Native apps and server-to-server calls (no `Origin` header)
//!   pass through untouched.
//! - Applied at the Router level, outside the access gate, so preflights never reach it.
//!
//! Policy:
//! - Allowed origins are an exact-match allowlist from Config.
//! - A request whose `Origin` is not on the list is answered 403 with no CORS headers.
//! - Wildcard origin is only accepted when credential sharing is off.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Method, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use url::Url;

use crate::error::AppError;

pub const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

pub const ALLOWED_HEADERS: [HeaderName; 2] = [header::AUTHORIZATION, header::CONTENT_TYPE];

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(60 * 10);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorsPolicyError {
    #[error("wildcard origin cannot be combined with credential sharing")]
    WildcardWithCredentials,
    #[error("credential sharing requires at least one allowed origin")]
    NoOriginsWithCredentials,
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),
}

#[derive(Debug, Clone)]
enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: AllowedOrigins,
    allow_credentials: bool,
}

impl CorsPolicy {
    pub fn new(origins: &[String], allow_credentials: bool) -> Result<Self, CorsPolicyError> {
        if origins.iter().any(|o| o == "*") {
            if allow_credentials {
                return Err(CorsPolicyError::WildcardWithCredentials);
            }
            return Ok(Self {
                origins: AllowedOrigins::Any,
                allow_credentials,
            });
        }
        if origins.is_empty() && allow_credentials {
            return Err(CorsPolicyError::NoOriginsWithCredentials);
        }

        let list = origins
            .iter()
            .map(|o| normalize_origin(o))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            origins: AllowedOrigins::List(list),
            allow_credentials,
        })
    }

    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    pub fn is_allowed(&self, origin: &HeaderValue) -> bool {
        match &self.origins {
            AllowedOrigins::Any => true,
            AllowedOrigins::List(list) => list.iter().any(|v| v == origin),
        }
    }

    fn layer(&self) -> CorsLayer {
        let allow_origin = match &self.origins {
            AllowedOrigins::Any => AllowOrigin::any(),
            AllowedOrigins::List(list) => AllowOrigin::list(list.clone()),
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(ALLOWED_METHODS)
            .allow_headers(ALLOWED_HEADERS)
            .allow_credentials(self.allow_credentials)
            .max_age(PREFLIGHT_MAX_AGE)
    }
}

// `https://Shop.Example.com:443/` -> `https://shop.example.com`
fn normalize_origin(raw: &str) -> Result<HeaderValue, CorsPolicyError> {
    let invalid = || CorsPolicyError::InvalidOrigin(raw.to_string());

    let url = Url::parse(raw).map_err(|_| invalid())?;
    let plain = matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some()
        && url.username().is_empty()
        && url.password().is_none()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none();
    if !plain {
        return Err(invalid());
    }

    HeaderValue::from_str(&url.origin().ascii_serialization()).map_err(|_| invalid())
}

/// Apply CORS to the given Router.
///
/// Layer order (outer → inner): origin gate → `CorsLayer` → router.
pub fn apply(router: Router, policy: &CorsPolicy) -> Router {
    let gate_policy = Arc::new(policy.clone());
    router
        .layer(policy.layer())
        .layer(middleware::from_fn_with_state(gate_policy, origin_gate))
}

async fn origin_gate(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(origin) = req.headers().get(header::ORIGIN)
        && !policy.is_allowed(origin)
    {
        warn!(
            origin = ?origin,
            method = %req.method(),
            path = %req.uri().path(),
            "cross-origin request from disallowed origin"
        );
        return AppError::Forbidden.into_response();
    }

    next.run(req).await
}
