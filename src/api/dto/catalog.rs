/*
 * Responsibility
 * - Category / Product request DTOs and their conversion into store inputs
 * - Responses reuse the catalog types directly (they are already Serialize)
 */
use serde::Deserialize;

use crate::services::catalog::{NewCategory, ProductInput};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.len() > 100 {
            return Err("name must be <= 100 chars");
        }
        Ok(())
    }

    pub fn into_new(self) -> NewCategory {
        NewCategory {
            name: self.name.trim().to_string(),
            description: self.description,
        }
    }
}

/// Body of both `POST /products` and `PUT /products/{id}` (full replace).
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
}

impl ProductRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.price_cents < 0 {
            return Err("price_cents must be >= 0");
        }
        if self.stock < 0 {
            return Err("stock must be >= 0");
        }
        if let Some(url) = &self.image_url
            && url.len() > 256
        {
            return Err("image_url must be <= 256 chars");
        }
        Ok(())
    }

    pub fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name.trim().to_string(),
            description: self.description,
            price_cents: self.price_cents,
            stock: self.stock,
            image_url: self.image_url,
            category_id: self.category_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price_cents: i64, stock: i32) -> ProductRequest {
        ProductRequest {
            name: name.into(),
            description: None,
            price_cents,
            stock,
            image_url: None,
            category_id: None,
        }
    }

    #[test]
    fn product_validation() {
        assert!(product("Mug", 900, 1).validate().is_ok());
        assert!(product("Mug", 0, 0).validate().is_ok());
        assert!(product(" ", 900, 1).validate().is_err());
        assert!(product("Mug", -1, 1).validate().is_err());
        assert!(product("Mug", 900, -1).validate().is_err());
    }

    #[test]
    fn category_name_is_trimmed() {
        let req = CreateCategoryRequest {
            name: "  Kitchen ".into(),
            description: None,
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.into_new().name, "Kitchen");
    }
}
