//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod libraries;
pub mod permissions;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub authors: authors::AuthorsRepository,
    pub libraries: libraries::LibrariesRepository,
    pub permissions: permissions::PermissionsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            libraries: libraries::LibrariesRepository::new(pool.clone()),
            permissions: permissions::PermissionsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Postgres SQLSTATE for unique constraint violations
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Postgres SQLSTATE for foreign key violations
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}
