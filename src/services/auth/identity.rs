/*
 * Responsibility
 * - Role / Identity: the authenticated principal carried through a request
 * - Identity always has at least one role (enforced at construction)
 */
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Coarse-grained permission label used for route-level authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Stored rows sometimes carry the `ROLE_` prefix.
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("identity must carry at least one role")]
pub struct EmptyRoleSet;

/// Verified principal. Immutable once built.
///
/// - `login_id` is the unique login identifier (email), also the token `sub`
/// - `user_id` is the internal reference id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    login_id: String,
    user_id: Uuid,
    roles: BTreeSet<Role>,
}

impl Identity {
    pub fn new(
        login_id: impl Into<String>,
        user_id: Uuid,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<Self, EmptyRoleSet> {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(EmptyRoleSet);
        }
        Ok(Self {
            login_id: login_id.into(),
            user_id,
            roles,
        })
    }

    pub fn login_id(&self) -> &str {
        &self.login_id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
