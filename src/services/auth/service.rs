use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::services::auth::{
    credentials::{CredentialStore, NewCredential},
    error::AuthError,
    identity::{Identity, Role},
    password::PasswordHasher,
    token::{IssuedToken, TokenCodec},
};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: Identity,
    pub issued: IssuedToken,
}

/// Login, registration and token verification.
///
/// - Holds the process-wide `TokenCodec` (signing key) and the credential store.
/// - Argon2 work runs on the blocking pool.
#[derive(Clone)]
pub struct AuthService {
    codec: TokenCodec,
    hasher: PasswordHasher,
    credentials: Arc<dyn CredentialStore>,
    // verified against when the login id is unknown, so both failure paths cost one hash
    dummy_hash: String,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("codec", &self.codec)
            .field("hasher", &self.hasher)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        codec: TokenCodec,
        hasher: PasswordHasher,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash("shopease-dummy-credential").map_err(|e| {
            error!(error = %e, "failed to prepare dummy password hash");
            AppError::Internal
        })?;

        Ok(Self {
            codec,
            hasher,
            credentials,
            dummy_hash,
        })
    }

    pub fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        self.codec.verify(token, now).map_err(AuthError::from)
    }

    /// Check a login id + secret and issue a bearer token.
    ///
    /// Unknown login id and wrong secret both come back as `AppError::Unauthorized`.
    pub async fn login(&self, login_id: &str, secret: &str) -> Result<LoginOutcome, AppError> {
        let login_id = normalize_login_id(login_id);

        let credential = self
            .credentials
            .find_by_login_id(&login_id)
            .await
            .map_err(|e| {
                error!(error = %e, "credential lookup failed");
                AppError::Internal
            })?;

        let hash = credential
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |c| c.password_hash.clone());
        let matched = self.verify_password(secret, hash).await?;

        let Some(credential) = credential.filter(|_| matched) else {
            debug!(reason = %AuthError::InvalidCredentials, "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        };

        let identity = credential.identity().map_err(|e| {
            warn!(user_id = %credential.user_id, error = %e, "login rejected: stored user has no roles");
            AppError::from(AuthError::InvalidCredentials)
        })?;

        let issued = self.codec.issue_now(&identity).map_err(|_| AppError::Internal)?;
        debug!(user_id = %identity.user_id(), "issued access token");

        Ok(LoginOutcome { identity, issued })
    }

    /// Register a new `USER` account.
    pub async fn register(&self, login_id: &str, secret: &str) -> Result<Identity, AppError> {
        let login_id = normalize_login_id(login_id);
        let password_hash = self.hash_password(secret).await?;

        let created = self
            .credentials
            .create(NewCredential {
                login_id,
                password_hash,
                roles: BTreeSet::from([Role::User]),
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AppError::Conflict,
                RepoError::Db(e) => {
                    error!(error = %e, "failed to create credential");
                    AppError::Internal
                }
            })?;

        created.identity().map_err(|_| AppError::Internal)
    }

    async fn verify_password(&self, secret: &str, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &hash))
            .await
            .map_err(|e| {
                error!(error = %e, "password verification task failed");
                AppError::Internal
            })
    }

    async fn hash_password(&self, secret: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| {
                error!(error = %e, "password hashing task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                error!(error = %e, "password hashing failed");
                AppError::Internal
            })
    }
}

/// Login ids are emails: compared trimmed and lower-cased.
pub fn normalize_login_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}
