/*
 * Responsibility
 * - SQLx access to the users table (credential lookup / registration)
 * - Converts rows into the CredentialStore contract types
 */
use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::auth::{Credential, CredentialStore, NewCredential, Role};

#[derive(FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    pub email: String,
    #[sqlx(rename = "passwordHash")]
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl UserRow {
    fn into_credential(self) -> Credential {
        let roles: BTreeSet<Role> = self
            .roles
            .iter()
            .filter_map(|r| match r.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!(user_id = %self.id, error = %e, "ignoring unknown stored role");
                    None
                }
            })
            .collect();

        Credential {
            user_id: self.id,
            login_id: self.email,
            password_hash: self.password_hash,
            roles,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgUserRepo {
    async fn find_by_login_id(&self, login_id: &str) -> Result<Option<Credential>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT "userId", email, "passwordHash", roles
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(login_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(UserRow::into_credential))
    }

    async fn create(&self, new: NewCredential) -> Result<Credential, RepoError> {
        let roles: Vec<String> = new.roles.iter().map(|r| r.as_str().to_string()).collect();

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, "passwordHash", roles)
            VALUES ($1, $2, $3)
            RETURNING "userId", email, "passwordHash", roles
            "#,
        )
        .bind(&new.login_id)
        .bind(&new.password_hash)
        .bind(&roles)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.into_credential())
    }
}
