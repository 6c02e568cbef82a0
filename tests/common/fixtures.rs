//! Shared test fixtures
#![allow(dead_code)]

use dumpwatch::orm::reports;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};

/// Insert a report row with explicit status and timestamps.
///
/// Goes through the ActiveModel directly so tests can construct historical
/// rows (old `created_at`, resolved long ago) that the submission flow
/// would never produce.
pub async fn insert_report(
    db: &DatabaseConnection,
    id: &str,
    status: &str,
    created_at: &str,
    updated_at: Option<&str>,
) -> reports::Model {
    reports::ActiveModel {
        id: Set(id.to_string()),
        description: Set(format!("fixture report {}", id)),
        location_name: Set("Test Hollow".to_string()),
        severity: Set("medium".to_string()),
        latitude: Set(0.0),
        longitude: Set(0.0),
        image_path: Set(format!("{}_site.jpg", id)),
        status: Set(status.to_string()),
        cleanup_image_path: Set(None),
        created_at: Set(created_at.to_string()),
        updated_at: Set(updated_at.map(str::to_string)),
        ai_confidence: Set(None),
    }
    .insert(db)
    .await
    .expect("fixture insert failed")
}
