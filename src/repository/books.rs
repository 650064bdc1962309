//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

const SELECT_BOOK: &str = r#"
    SELECT b.id, b.title, b.author_id, a.name AS author_name,
           b.created_by, b.created_at, b.updated_at
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("{SELECT_BOOK} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref title) = query.title {
            params.push(format!("%{}%", title.to_lowercase()));
            conditions.push(format!("LOWER(b.title) LIKE ${}", params.len()));
        }

        if let Some(ref author) = query.author {
            params.push(format!("%{}%", author.to_lowercase()));
            conditions.push(format!("LOWER(a.name) LIKE ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!(
            "SELECT COUNT(*) FROM books b JOIN authors a ON a.id = b.author_id {}",
            where_clause
        );

        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "{SELECT_BOOK} {} ORDER BY b.title LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );

        let mut select_builder = sqlx::query_as::<_, Book>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let books = select_builder.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Create a new book
    pub async fn create(
        &self,
        title: &str,
        author_id: i32,
        created_by: Option<i32>,
    ) -> AppResult<Book> {
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, author_id, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(author_id)
        .bind(created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update title and/or author of an existing book
    pub async fn update(
        &self,
        id: i32,
        title: Option<&str>,
        author_id: Option<i32>,
    ) -> AppResult<Book> {
        let now = Utc::now();

        let mut sets = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        if title.is_some() {
            sets.push(format!("title = ${}", param_idx));
            param_idx += 1;
        }
        if author_id.is_some() {
            sets.push(format!("author_id = ${}", param_idx));
        }

        let query = format!("UPDATE books SET {} WHERE id = {}", sets.join(", "), id);

        let mut builder = sqlx::query(&query).bind(now);
        if let Some(title) = title {
            builder = builder.bind(title);
        }
        if let Some(author_id) = author_id {
            builder = builder.bind(author_id);
        }

        let updated = builder.execute(&self.pool).await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book permanently
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Find a book by exact title and author, used by idempotent seeding
    pub async fn find_by_title_and_author(
        &self,
        title: &str,
        author_id: i32,
    ) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "{SELECT_BOOK} WHERE b.title = $1 AND b.author_id = $2"
        ))
        .bind(title)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Total number of books, for the dashboards
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
