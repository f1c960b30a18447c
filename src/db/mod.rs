pub mod connection;
pub mod email_repository;
pub mod event_repository;
pub mod job_repository;
pub mod migrations;
pub mod models;
pub mod user_repository;

/// Open an isolated in-memory database with the full schema applied.
///
/// A single pooled connection keeps the in-memory database alive for the
/// whole test; more connections would each see their own empty database.
#[cfg(test)]
pub async fn test_pool() -> sqlx::Pool<sqlx::Sqlite> {
    use sqlx::sqlite::SqlitePoolOptions;

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    migrations::run_migrations(&pool)
        .await
        .expect("failed to apply migrations");

    pool
}
