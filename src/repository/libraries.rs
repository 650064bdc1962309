//! Libraries repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        library::{Librarian, Library, LibraryDetails, LibraryShort},
    },
};

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Postgres>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all libraries with their book counts
    pub async fn list(&self) -> AppResult<Vec<LibraryShort>> {
        let libraries = sqlx::query_as::<_, LibraryShort>(
            r#"
            SELECT l.id, l.name,
                   (SELECT COUNT(*) FROM library_books lb WHERE lb.library_id = l.id) AS book_count
            FROM libraries l
            ORDER BY l.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(libraries)
    }

    /// Get a library with its books and librarian
    pub async fn get_details(&self, id: i32) -> AppResult<LibraryDetails> {
        let library = sqlx::query_as::<_, Library>("SELECT id, name FROM libraries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))?;

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author_id, a.name AS author_name,
                   b.created_by, b.created_at, b.updated_at
            FROM library_books lb
            JOIN books b ON b.id = lb.book_id
            JOIN authors a ON a.id = b.author_id
            WHERE lb.library_id = $1
            ORDER BY b.title
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let librarian = sqlx::query_as::<_, Librarian>(
            "SELECT id, name, library_id FROM librarians WHERE library_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(LibraryDetails {
            id: library.id,
            name: library.name,
            books,
            librarian,
        })
    }

    /// Find a library by name, creating it when unknown
    pub async fn get_or_create(&self, name: &str) -> AppResult<Library> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO libraries (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(Library {
            id,
            name: name.to_string(),
        })
    }

    /// Attach a book to a library. Already attached is not an error.
    pub async fn add_book(&self, library_id: i32, book_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO library_books (library_id, book_id) VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(library_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Assign the librarian of a library, replacing any previous one
    pub async fn set_librarian(&self, library_id: i32, name: &str) -> AppResult<Librarian> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO librarians (name, library_id) VALUES ($1, $2)
            ON CONFLICT (library_id) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(library_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Librarian {
            id,
            name: name.to_string(),
            library_id,
        })
    }
}
