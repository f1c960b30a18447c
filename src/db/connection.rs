use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error, Pool, Sqlite,
};
use std::str::FromStr;

/// Create a SQLite connection pool
///
/// # Parameters
/// - `database_url`: SQLite connection string
///   Format: sqlite://PATH (the file is created if missing)
/// - `max_connections`: upper bound on pooled connections
///
/// Foreign key enforcement is switched on for every connection; the events
/// table references jobs and relies on it.
pub async fn get_connection(
    database_url: &str,
    max_connections: u32,
) -> Result<Pool<Sqlite>, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}
