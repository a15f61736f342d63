/*
 * Responsibility
 * - products CRUD + filtered search (ProductStore over PgPool)
 * - "categoryId" is a nullable FK (ON DELETE SET NULL)
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;
use crate::services::catalog::{Product, ProductFilter, ProductInput, ProductStore};

#[derive(Debug, FromRow)]
pub struct ProductRow {
    #[sqlx(rename = "productId")]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "priceCents")]
    pub price_cents: i64,
    pub stock: i32,
    #[sqlx(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[sqlx(rename = "categoryId")]
    pub category_id: Option<i64>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            stock: row.stock,
            image_url: row.image_url,
            category_id: row.category_id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgProductRepo {
    db: PgPool,
}

impl PgProductRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductRepo {
    async fn list(&self) -> Result<Vec<Product>, RepoError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT "productId", name, description, "priceCents", stock, "imageUrl", "categoryId"
            FROM products
            ORDER BY "productId" DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT "productId", name, description, "priceCents", stock, "imageUrl", "categoryId"
            FROM products
            WHERE "productId" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn create(&self, input: ProductInput) -> Result<Product, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, description, "priceCents", stock, "imageUrl", "categoryId")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING "productId", name, description, "priceCents", stock, "imageUrl", "categoryId"
            "#,
        )
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(input.image_url.as_deref())
        .bind(input.category_id)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, input: ProductInput) -> Result<Option<Product>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET
                name = $2,
                description = $3,
                "priceCents" = $4,
                stock = $5,
                "imageUrl" = $6,
                "categoryId" = $7
            WHERE "productId" = $1
            RETURNING "productId", name, description, "priceCents", stock, "imageUrl", "categoryId"
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(input.image_url.as_deref())
        .bind(input.category_id)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM products
            WHERE "productId" = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepoError> {
        // NULL parameters disable their predicate
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT "productId", name, description, "priceCents", stock, "imageUrl", "categoryId"
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' ESCAPE '\')
              AND ($2::bigint IS NULL OR "categoryId" = $2)
              AND ($3::bigint IS NULL OR "priceCents" >= $3)
              AND ($4::bigint IS NULL OR "priceCents" <= $4)
            ORDER BY "productId" DESC
            "#,
        )
        .bind(filter.name.as_deref().map(escape_like))
        .bind(filter.category_id)
        .bind(filter.min_price_cents)
        .bind(filter.max_price_cents)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

// `%` and `_` in a search term match themselves.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
