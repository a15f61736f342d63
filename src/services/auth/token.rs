//! Bearer token codec (HS256 JWT).
//!
//! `jsonwebtoken` checks, in order: structure/header, algorithm, signature, then decodes claims
//! and checks `iss`/`aud`. Expiry is evaluated here against the caller-supplied `now` so that
//! time is an explicit input (and the configured leeway is the only tolerance).

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use super::identity::{Identity, Role};

/// HMAC signing secret. Loaded once at startup, never printed.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub const MIN_LEN: usize = 32;

    pub fn new(bytes: Vec<u8>) -> Option<Self> {
        (bytes.len() >= Self::MIN_LEN).then_some(Self(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Immutable settings handed to [`TokenCodec::new`].
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub signing_key: SigningKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
    pub leeway_seconds: u64,
}

/// Why a presented token was refused. Internal only: clients see a uniform 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("malformed token")]
    Malformed,
    #[error("signature invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Error)]
#[error("failed to sign token: {0}")]
pub struct TokenSignError(#[from] jsonwebtoken::errors::Error);

#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    iss: String,
    aud: String,
    sub: String,
    uid: Uuid,
    roles: Vec<Role>,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Issued token plus the metadata the login response needs.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
    leeway_seconds: u64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        let key = config.signing_key.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        // exp is checked against the caller's clock in `verify`
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: config.ttl,
            leeway_seconds: config.leeway_seconds,
        }
    }

    /// Issue a token for `identity` valid from `now` until `now + ttl`.
    pub fn issue(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenSignError> {
        let expires_at = now + ttl;
        let claims = AccessTokenClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: identity.login_id().to_string(),
            uid: identity.user_id(),
            roles: identity.roles().iter().copied().collect(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign access token");
            TokenSignError(e)
        })?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: ttl.num_seconds().max(0) as u64,
        })
    }

    /// Issue with the configured lifetime.
    pub fn issue_now(&self, identity: &Identity) -> Result<IssuedToken, TokenSignError> {
        self.issue(identity, Utc::now(), self.ttl)
    }

    /// Verify signature and claims, then check expiry at `now`.
    ///
    /// Valid iff the signature checks out and `now < exp + leeway`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenRejection> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenRejection::SignatureInvalid,
            _ if signature_segment_damaged(token) => TokenRejection::SignatureInvalid,
            _ => TokenRejection::Malformed,
        })?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp.saturating_add(self.leeway_seconds as i64) {
            return Err(TokenRejection::Expired);
        }
        if claims.sub.trim().is_empty() {
            return Err(TokenRejection::Malformed);
        }

        Identity::new(claims.sub, claims.uid, claims.roles).map_err(|_| TokenRejection::Malformed)
    }
}

// Header and claims are intact but the signature text no longer decodes.
fn signature_segment_damaged(token: &str) -> bool {
    let mut parts = token.splitn(3, '.');
    let (Some(header), Some(payload), Some(signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let header_ok = URL_SAFE_NO_PAD
        .decode(header)
        .ok()
        .and_then(|h| serde_json::from_slice::<Header>(&h).ok())
        .is_some_and(|h| h.alg == Algorithm::HS256);
    let payload_ok = URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .is_some_and(|p| serde_json::from_slice::<AccessTokenClaims>(&p).is_ok());

    header_ok && payload_ok && URL_SAFE_NO_PAD.decode(signature).is_err()
}
