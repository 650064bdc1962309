//! Catalog management service: books, authors, libraries

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorWithBookCount, CreateAuthor},
        book::{Book, BookQuery, CreateBook, UpdateBook},
        library::{LibraryDetails, LibraryShort},
    },
    repository::Repository,
};

const MAX_TITLE_LEN: usize = 200;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with filters
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, payload: CreateBook, created_by: i32) -> AppResult<Book> {
        let title = validate_title(&payload.title)?;
        let author = self
            .resolve_author(payload.author_id, payload.author_name.as_deref())
            .await?;

        let book = self
            .repository
            .books
            .create(&title, author.id, Some(created_by))
            .await?;

        tracing::info!(
            "Book '{}' by '{}' created (id={})",
            book.title,
            book.author_name,
            book.id
        );
        Ok(book)
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, payload: UpdateBook) -> AppResult<Book> {
        let title = match payload.title {
            Some(ref t) => Some(validate_title(t)?),
            None => None,
        };

        let author_id = if payload.author_id.is_some() || payload.author_name.is_some() {
            let author = self
                .resolve_author(payload.author_id, payload.author_name.as_deref())
                .await?;
            Some(author.id)
        } else {
            None
        };

        if title.is_none() && author_id.is_none() {
            return Err(AppError::Validation(
                "Nothing to update: provide a title or an author".to_string(),
            ));
        }

        self.repository
            .books
            .update(id, title.as_deref(), author_id)
            .await
    }

    /// Delete a book permanently
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    /// Resolve the author reference of a book payload: an explicit id must
    /// exist, a name is created on the fly when unknown.
    async fn resolve_author(
        &self,
        author_id: Option<i32>,
        author_name: Option<&str>,
    ) -> AppResult<Author> {
        if let Some(id) = author_id {
            if !self.repository.authors.exists(id).await? {
                return Err(AppError::Validation(format!(
                    "author_id: author {} does not exist",
                    id
                )));
            }
            return self.repository.authors.get_by_id(id).await;
        }

        let name = author_name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(AppError::Validation(
                "author: provide author_id or a non-empty author_name".to_string(),
            ));
        }

        self.repository.authors.get_or_create(name).await
    }

    /// List all authors
    pub async fn list_authors(&self) -> AppResult<Vec<AuthorWithBookCount>> {
        self.repository.authors.list().await
    }

    /// Get author by ID
    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    /// Create a new author
    pub async fn create_author(&self, payload: CreateAuthor) -> AppResult<Author> {
        payload.validate().map_err(AppError::from_validation)?;
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "name: must not be empty".to_string(),
            ));
        }
        self.repository.authors.create(name).await
    }

    /// Delete an author. Fails with a conflict while books reference it.
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    /// Total number of books, for the dashboards
    pub async fn count_books(&self) -> AppResult<i64> {
        self.repository.books.count().await
    }

    /// List all libraries
    pub async fn list_libraries(&self) -> AppResult<Vec<LibraryShort>> {
        self.repository.libraries.list().await
    }

    /// Get a library with its books and librarian
    pub async fn get_library(&self, id: i32) -> AppResult<LibraryDetails> {
        self.repository.libraries.get_details(id).await
    }
}

/// Validate and normalize a book title: non-empty after trimming, bounded
fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation(
            "title: must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title: must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        assert_eq!(validate_title("  1984  ").unwrap(), "1984");
    }

    #[test]
    fn empty_title_is_rejected() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn overlong_title_is_rejected() {
        let title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(validate_title(&title).is_err());
        let title = "x".repeat(MAX_TITLE_LEN);
        assert!(validate_title(&title).is_ok());
    }
}
