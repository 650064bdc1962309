//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Full book model from database, with the joined author name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub author_name: String,
    /// User who added the book, if still known
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Substring match on the title
    pub title: Option<String>,
    /// Substring match on the author name
    pub author: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request. The author is given either by id (must exist) or
/// by name (created on the fly when unknown).
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: String,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
}

/// Update book request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
}
