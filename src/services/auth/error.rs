use thiserror::Error;

use super::token::TokenRejection;

/// Internal reasons an auth decision failed.
///
/// These are logged. Clients only ever see a uniform 401 (authentication) or 403
/// (authorization); see `From<AuthError> for AppError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("expired token")]
    ExpiredToken,
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("no access rule matched; default deny")]
    UnknownRoute,
    #[error("role mismatch")]
    RoleMismatch,
    #[error("invalid login credentials")]
    InvalidCredentials,
}

impl AuthError {
    /// `true` for failures of "who are you", `false` for "what may you do".
    pub fn is_authentication(&self) -> bool {
        !matches!(self, AuthError::RoleMismatch)
    }
}

impl From<TokenRejection> for AuthError {
    fn from(r: TokenRejection) -> Self {
        match r {
            TokenRejection::Malformed => AuthError::MalformedToken,
            TokenRejection::SignatureInvalid => AuthError::InvalidSignature,
            TokenRejection::Expired => AuthError::ExpiredToken,
        }
    }
}
