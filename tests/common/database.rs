//! Test database setup and management
#![allow(dead_code)]

use sea_orm::{Database, DatabaseConnection};

/// Connect a fresh in-memory SQLite database and apply all migrations.
///
/// Every call returns an isolated database, so tests do not interfere with
/// each other.
pub async fn setup_test_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory test database");

    dumpwatch::migrate::run_migrations(&db)
        .await
        .expect("Migrations failed on test database");

    db
}
