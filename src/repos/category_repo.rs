/*
 * Responsibility
 * - categories CRUD (CategoryStore over PgPool)
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;
use crate::services::catalog::{Category, CategoryStore, NewCategory};

#[derive(Debug, FromRow)]
pub struct CategoryRow {
    #[sqlx(rename = "categoryId")]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgCategoryRepo {
    db: PgPool,
}

impl PgCategoryRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryRepo {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT "categoryId", name, description
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Category>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT "categoryId", name, description
            FROM categories
            WHERE "categoryId" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn create(&self, new: NewCategory) -> Result<Category, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING "categoryId", name, description
            "#,
        )
        .bind(&new.name)
        .bind(new.description.as_deref())
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE "categoryId" = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
