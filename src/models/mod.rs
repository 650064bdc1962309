//! Data models for the Bookshelf catalog and identity layer

pub mod author;
pub mod book;
pub mod library;
pub mod permission;
pub mod profile;
pub mod user;
