pub mod credentials;
pub mod error;
pub mod identity;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;

pub use credentials::{Credential, CredentialStore, NewCredential};
pub use error::AuthError;
pub use identity::{Identity, Role};
pub use password::PasswordHasher;
pub use policy::{Access, AccessPolicy};
pub use service::AuthService;
pub use token::{SigningKey, TokenCodec, TokenConfig, TokenRejection};
