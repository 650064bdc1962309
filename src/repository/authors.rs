//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorWithBookCount},
    repository::{is_foreign_key_violation, is_unique_violation},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all authors with their book counts
    pub async fn list(&self) -> AppResult<Vec<AuthorWithBookCount>> {
        let authors = sqlx::query_as::<_, AuthorWithBookCount>(
            r#"
            SELECT a.id, a.name,
                   (SELECT COUNT(*) FROM books b WHERE b.author_id = a.id) AS book_count
            FROM authors a
            ORDER BY a.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// Check that an author exists
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a new author. Duplicate names are a conflict.
    pub async fn create(&self, name: &str) -> AppResult<Author> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO authors (name) VALUES ($1) RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Author '{}' already exists", name))
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(Author {
            id,
            name: name.to_string(),
        })
    }

    /// Find an author by name, creating it when unknown
    pub async fn get_or_create(&self, name: &str) -> AppResult<Author> {
        // The upsert keeps concurrent creates from racing on the unique name
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO authors (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(Author {
            id,
            name: name.to_string(),
        })
    }

    /// Delete an author. Authors still referenced by books cannot be
    /// deleted; the FK violation surfaces as a conflict, not a 500.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict(format!(
                        "Author with id {} is still referenced by books",
                        id
                    ))
                } else {
                    AppError::Database(e)
                }
            })?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Author with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
