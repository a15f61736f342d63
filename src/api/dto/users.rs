use serde::Serialize;
use uuid::Uuid;

use crate::services::auth::{Identity, Role};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub login_id: String,
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl From<&Identity> for ProfileResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            login_id: identity.login_id().to_string(),
            user_id: identity.user_id(),
            roles: identity.roles().iter().copied().collect(),
        }
    }
}
