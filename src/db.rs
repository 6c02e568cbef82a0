//! Database connection handling.
//!
//! A single SeaORM connection pool is initialized once at startup and shared
//! through a `OnceCell`. Each request borrows the pool for one or a few
//! statements; there are no long-lived transactions.

use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect to the database and store the pool globally.
///
/// Panics if called twice or if the connection fails; the application cannot
/// run without its store.
pub async fn init_db(database_url: String) {
    let pool = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database.");

    DB_POOL
        .set(pool)
        .expect("init_db() was called more than once.");

    log::info!("Database pool initialized");
}

/// Borrow the global connection pool.
///
/// Panics if `init_db` has not been called.
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL
        .get()
        .expect("Database pool accessed before init_db().")
}
