/*
 * Responsibility
 * - Catalog types (Category / Product) and the store contracts handlers call
 * - No business rules here: handlers are pass-throughs, authorization already happened upstream
 */
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
}

/// Full set of writable product fields (create and replace).
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
}

/// Search criteria; every field is optional and they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
}

impl ProductFilter {
    pub fn matches(&self, p: &Product) -> bool {
        self.name.as_deref().is_none_or(|n| {
            p.name.to_lowercase().contains(&n.to_lowercase())
        }) && self.category_id.is_none_or(|c| p.category_id == Some(c))
            && self.min_price_cents.is_none_or(|min| p.price_cents >= min)
            && self.max_price_cents.is_none_or(|max| p.price_cents <= max)
    }
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, RepoError>;
    async fn get(&self, id: i64) -> Result<Option<Category>, RepoError>;
    async fn create(&self, new: NewCategory) -> Result<Category, RepoError>;
    /// `Ok(false)` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepoError>;
    async fn get(&self, id: i64) -> Result<Option<Product>, RepoError>;
    async fn create(&self, input: ProductInput) -> Result<Product, RepoError>;
    /// `Ok(None)` when the product does not exist.
    async fn update(&self, id: i64, input: ProductInput) -> Result<Option<Product>, RepoError>;
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepoError>;
}
