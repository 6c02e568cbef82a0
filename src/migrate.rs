//! Versioned, idempotent schema migration.
//!
//! Runs at server startup (and from tests) instead of as ad hoc scripts.
//! Every step tolerates being applied twice: create-if-absent,
//! delete-by-id, add-column-if-absent.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Statement};

/// One report row known to be corrupt in the production data set.
const KNOWN_BAD_REPORT_ID: &str = "0eb0e06a";

const CREATE_REPORTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS reports (
        id TEXT PRIMARY KEY,
        description TEXT,
        location_name TEXT,
        severity TEXT,
        latitude REAL,
        longitude REAL,
        image_path TEXT,
        status TEXT DEFAULT 'Pending',
        cleanup_image_path TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP,
        ai_confidence INTEGER
    )
";

/// Apply all migration steps in order.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_reports_table(db).await?;
    delete_known_bad_report(db).await?;
    add_updated_at_column(db).await?;
    log::info!("Schema migrations complete");
    Ok(())
}

fn stmt(db: &DatabaseConnection, sql: &str) -> Statement {
    Statement::from_string(db.get_database_backend(), sql.to_string())
}

/// Step 1: the reports table, full column set.
async fn create_reports_table(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(stmt(db, CREATE_REPORTS_TABLE)).await?;
    Ok(())
}

/// Step 2: remove the known-bad row. A no-op when already gone.
async fn delete_known_bad_report(db: &DatabaseConnection) -> Result<(), DbErr> {
    let result = db
        .execute(stmt(
            db,
            &format!("DELETE FROM reports WHERE id = '{}'", KNOWN_BAD_REPORT_ID),
        ))
        .await?;

    if result.rows_affected() > 0 {
        log::info!("Deleted known-bad report {}", KNOWN_BAD_REPORT_ID);
    }
    Ok(())
}

/// Step 3: add `updated_at` to tables created before the column existed.
///
/// SQLite has no ADD COLUMN IF NOT EXISTS; a "duplicate column name" error
/// means the step was already applied and counts as success.
async fn add_updated_at_column(db: &DatabaseConnection) -> Result<(), DbErr> {
    match db
        .execute(stmt(
            db,
            "ALTER TABLE reports ADD COLUMN updated_at TIMESTAMP",
        ))
        .await
    {
        Ok(_) => {
            log::info!("Added updated_at column to reports");
            Ok(())
        }
        Err(e) if e.to_string().contains("duplicate column name") => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Database;

    async fn fresh_db() -> DatabaseConnection {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    #[actix_rt::test]
    async fn test_migrations_run_twice() {
        let db = fresh_db().await;
        run_migrations(&db).await.unwrap();
        // Idempotent: a second run must not fail.
        run_migrations(&db).await.unwrap();
    }

    #[actix_rt::test]
    async fn test_known_bad_report_removed() {
        let db = fresh_db().await;
        create_reports_table(&db).await.unwrap();

        db.execute(stmt(
            &db,
            &format!(
                "INSERT INTO reports (id, description) VALUES ('{}', 'bad row')",
                KNOWN_BAD_REPORT_ID
            ),
        ))
        .await
        .unwrap();

        run_migrations(&db).await.unwrap();

        let found = crate::reports::find_report(&db, KNOWN_BAD_REPORT_ID)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[actix_rt::test]
    async fn test_add_updated_at_to_legacy_table() {
        let db = fresh_db().await;

        // A table created before the updated_at column existed.
        db.execute(stmt(
            &db,
            "CREATE TABLE reports (
                id TEXT PRIMARY KEY,
                description TEXT,
                location_name TEXT,
                severity TEXT,
                latitude REAL,
                longitude REAL,
                image_path TEXT,
                status TEXT DEFAULT 'Pending',
                cleanup_image_path TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                ai_confidence INTEGER
            )",
        ))
        .await
        .unwrap();

        run_migrations(&db).await.unwrap();

        // The entity selects updated_at, so this only works once it exists.
        let rows = crate::reports::all_reports(&db).await.unwrap();
        assert!(rows.is_empty());
    }
}
