//! SeaORM Entity for the reports table
//!
//! Timestamps are kept as text columns in the legacy format. The public
//! visibility filter has to parse `updated_at` defensively (two formats,
//! hide on failure), so the raw string is preserved all the way up.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    /// 8-character hex id, generated server-side at creation.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub location_name: String,
    pub severity: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Filename of the originally uploaded photo, relative to the uploads dir.
    pub image_path: String,
    pub status: String,
    pub cleanup_image_path: Option<String>,
    pub created_at: String,
    /// Null until the first admin edit.
    pub updated_at: Option<String>,
    /// Reserved column for a planned severity-scoring feature. Never written.
    pub ai_confidence: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
