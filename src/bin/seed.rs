//! Seed the database with sample catalog data and test users.
//!
//! Usage: `cargo run --bin seed`

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf_server::{
    config::AppConfig,
    repository::Repository,
    services::{email::EmailService, seed::SeedService, users::UsersService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookshelf_server={}", config.logging.level).into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let repository = Repository::new(pool);
    let users = UsersService::new(
        repository.clone(),
        config.auth.clone(),
        EmailService::new(config.email.clone()),
    );
    let seed = SeedService::new(repository, users);

    let summary = seed.run().await?;

    tracing::info!(
        "Sample data ready: {} authors, {} books, {} library, {} users \
         (admin_user, librarian_user, member_user / password123)",
        summary.authors,
        summary.books,
        summary.libraries,
        summary.users
    );

    Ok(())
}
