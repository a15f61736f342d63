//! Credential lookup contract used by login.
//!
//! Persistence lives behind this trait (`repos::user_repo::PgUserRepo` in production).
use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::auth::identity::{EmptyRoleSet, Identity, Role};

/// Stored user record: identity fields plus the one-way password hash.
#[derive(Clone)]
pub struct Credential {
    pub user_id: Uuid,
    pub login_id: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the hash
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("login_id", &self.login_id)
            .field("roles", &self.roles)
            .finish()
    }
}

impl Credential {
    pub fn identity(&self) -> Result<Identity, EmptyRoleSet> {
        Identity::new(self.login_id.clone(), self.user_id, self.roles.iter().copied())
    }
}

/// Input for registering a new credential. `password_hash` must already be hashed.
pub struct NewCredential {
    pub login_id: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Single lookup, no side effects. `Ok(None)` when the login id is unknown.
    async fn find_by_login_id(&self, login_id: &str) -> Result<Option<Credential>, RepoError>;

    /// Insert a new credential. `RepoError::Conflict` when the login id is taken.
    async fn create(&self, new: NewCredential) -> Result<Credential, RepoError>;
}
