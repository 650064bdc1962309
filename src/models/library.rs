//! Library and librarian models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;

/// Library row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Library {
    pub id: i32,
    pub name: String,
}

/// Library listing entry with its book count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LibraryShort {
    pub id: i32,
    pub name: String,
    pub book_count: i64,
}

/// Librarian row: one librarian per library
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Librarian {
    pub id: i32,
    pub name: String,
    pub library_id: i32,
}

/// Library detail: the library, its books, and its librarian if any
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LibraryDetails {
    pub id: i32,
    pub name: String,
    pub books: Vec<Book>,
    pub librarian: Option<Librarian>,
}
