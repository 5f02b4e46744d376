pub mod repository;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::PersistenceError;

pub use repository::{CourseRepository, SqliteCourseRepository};

/// Opens the SQLite pool, creating the database file when missing.
///
/// An in-memory database lives only as long as its connection, so such a URL
/// gets a single connection that is never recycled.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, PersistenceError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), PersistenceError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
