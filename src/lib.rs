//! Bookshelf Library Catalog Server
//!
//! A REST JSON API for a book/library catalog with user accounts, coarse
//! roles (Admin/Librarian/Member), and fine-grained per-action book
//! permissions granted through groups or directly to users.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
