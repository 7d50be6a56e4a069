//! Otakuy Music Storage
//!
//! `SQLite` persistence for the album catalog and the user accounts the
//! identity collaborator reads.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: `albums` and `users` each own their queries
//! - **Store Adapter**: [`SqliteAlbumStore`] implements `otakuy_core::AlbumStore`
//! - **Last Writer Wins**: `save` is an upsert; concurrent edits of one album
//!   overwrite each other
//!
//! # Example
//!
//! ```rust,no_run
//! use otakuy_core::{AlbumStore, AlbumFilter, AlbumStatus};
//! use otakuy_storage::{create_pool, run_migrations, SqliteAlbumStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://otakuy.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteAlbumStore::new(pool);
//! let pending = store.count(&AlbumFilter::Status(AlbumStatus::Pending)).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod albums;
pub mod users;

pub use context::SqliteAlbumStore;
pub use error::StorageError;
pub use users::UserRecord;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://otakuy.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("SQLite pool ready");

    Ok(pool)
}
