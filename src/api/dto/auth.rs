/*
 * Responsibility
 * - Login / registration request and response DTOs
 * - validate() does shape checks only; credential checks belong to AuthService
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::auth::Role;

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 1024;
const MAX_EMAIL_LEN: usize = 254;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("email and password are required");
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let email = self.email.trim();
        if email.is_empty() || email.len() > MAX_EMAIL_LEN {
            return Err("email is required");
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err("email must be an address"),
        }
        let len = self.password.chars().count();
        if len < MIN_PASSWORD_LEN {
            return Err("password must be at least 8 characters");
        }
        if len > MAX_PASSWORD_LEN {
            return Err("password is too long");
        }
        Ok(())
    }
}

// Requests carry a password; keep it out of logs.
impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub username: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn registration_shape_checks() {
        assert!(register("shopper@example.com", "hunter22").validate().is_ok());
        assert!(register("  shopper@example.com ", "hunter22").validate().is_ok());

        assert!(register("shopper@example.com", "short").validate().is_err());
        assert!(register("shopper.example.com", "hunter22").validate().is_err());
        assert!(register("@example.com", "hunter22").validate().is_err());
        assert!(register("shopper@", "hunter22").validate().is_err());
        assert!(register("   ", "hunter22").validate().is_err());
    }

    #[test]
    fn debug_output_hides_the_password() {
        let printed = format!("{:?}", register("shopper@example.com", "s3cret-value"));
        assert!(printed.contains("shopper@example.com"));
        assert!(!printed.contains("s3cret-value"));
    }
}
