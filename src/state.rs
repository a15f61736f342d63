/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to clone: everything behind Arc
 * - Stores are trait objects so tests can swap Postgres for in-memory ones
 */
use std::sync::Arc;

use crate::services::auth::{AccessPolicy, AuthService};
use crate::services::catalog::{CategoryStore, ProductStore};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub policy: Arc<AccessPolicy>,
    pub categories: Arc<dyn CategoryStore>,
    pub products: Arc<dyn ProductStore>,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthService>,
        policy: Arc<AccessPolicy>,
        categories: Arc<dyn CategoryStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            auth,
            policy,
            categories,
            products,
        }
    }
}
