//! Sample data seeding, used by the `seed` binary
//!
//! Idempotent: running it twice leaves the database unchanged.

use serde::Serialize;

use crate::{
    error::AppResult,
    models::profile::Role,
    repository::Repository,
    services::users::UsersService,
};

const SAMPLE_PASSWORD: &str = "password123";

#[derive(Debug, Serialize)]
pub struct SeedSummary {
    pub authors: i64,
    pub books: i64,
    pub libraries: usize,
    pub users: usize,
}

#[derive(Clone)]
pub struct SeedService {
    repository: Repository,
    users: UsersService,
}

impl SeedService {
    pub fn new(repository: Repository, users: UsersService) -> Self {
        Self { repository, users }
    }

    /// Create sample authors, books, one library with a librarian, and
    /// three test users with matching roles.
    pub async fn run(&self) -> AppResult<SeedSummary> {
        let rowling = self.repository.authors.get_or_create("J.K. Rowling").await?;
        let orwell = self.repository.authors.get_or_create("George Orwell").await?;
        let austen = self.repository.authors.get_or_create("Jane Austen").await?;

        let sample_books = [
            ("Harry Potter and the Philosopher's Stone", rowling.id),
            ("1984", orwell.id),
            ("Pride and Prejudice", austen.id),
            ("Animal Farm", orwell.id),
        ];

        let library = self
            .repository
            .libraries
            .get_or_create("Central Library")
            .await?;

        for (title, author_id) in sample_books {
            let book = match self
                .repository
                .books
                .find_by_title_and_author(title, author_id)
                .await?
            {
                Some(existing) => existing,
                None => self.repository.books.create(title, author_id, None).await?,
            };
            self.repository.libraries.add_book(library.id, book.id).await?;
        }

        self.repository
            .libraries
            .set_librarian(library.id, "John Smith")
            .await?;

        let admin = self
            .users
            .ensure_user("admin_user", SAMPLE_PASSWORD, Some("admin@library.com"), Role::Admin)
            .await?;
        let librarian = self
            .users
            .ensure_user(
                "librarian_user",
                SAMPLE_PASSWORD,
                Some("librarian@library.com"),
                Role::Librarian,
            )
            .await?;
        self.users
            .ensure_user(
                "member_user",
                SAMPLE_PASSWORD,
                Some("member@library.com"),
                Role::Member,
            )
            .await?;

        // Admin and librarian users get all four book permissions through
        // the admins group; the member user gets none.
        let admins_group = self.repository.permissions.get_group_by_name("admins").await?;
        for user_id in [admin.id, librarian.id] {
            if let Err(e) = self.repository.permissions.add_member(admins_group.id, user_id).await {
                // Already a member on re-runs
                tracing::debug!("Skipping group membership for user {}: {}", user_id, e);
            }
        }

        Ok(SeedSummary {
            authors: 3,
            books: self.repository.books.count().await?,
            libraries: 1,
            users: 3,
        })
    }
}
