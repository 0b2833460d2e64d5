//! Authors repository for database operations

use std::collections::HashSet;

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, name, last_name FROM authors ORDER BY last_name, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    /// All known author ids, for validating form selections
    pub async fn ids(&self) -> AppResult<HashSet<i32>> {
        let rows = sqlx::query("SELECT id FROM authors")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|r| r.get("id")).collect())
    }

    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name, last_name) VALUES ($1, $2) RETURNING id, name, last_name",
        )
        .bind(&author.name)
        .bind(&author.last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Delete an author; junction rows cascade, books survive
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }

        Ok(())
    }
}
