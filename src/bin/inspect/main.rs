//! Read-only inspection tool: dump the reports schema and rows.
//!
//! Operator-run, outside the request path.

use anyhow::Context;
use dumpwatch::orm::reports;
use sea_orm::{ConnectionTrait, Database, EntityTrait, Statement};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://database.db?mode=rwc".to_string());
    let db = Database::connect(&database_url)
        .await
        .context("Failed to connect to the database")?;

    println!("--- Table Info ---");
    let columns = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA table_info(reports)".to_string(),
        ))
        .await
        .context("Failed to read table info")?;
    for row in &columns {
        let name: String = row.try_get("", "name")?;
        let column_type: String = row.try_get("", "type")?;
        println!("{} ({})", name, column_type);
    }

    println!("\n--- Reports ---");
    let rows = reports::Entity::find().all(&db).await?;
    for r in rows {
        println!("{}", serde_json::to_string(&r)?);
    }

    Ok(())
}
