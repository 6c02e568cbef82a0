//! Report domain logic: lifecycle, public visibility, and store access.
//!
//! A report is created once by the submission flow, mutated zero or more
//! times by the admin review flow, and never deleted by the request path.
//! The public map shows every unresolved report plus reports resolved less
//! than 24 hours ago; that window is a hard design decision, not config.

use crate::orm::reports;
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// How long a resolved report stays on the public map, measured from its
/// last admin edit. Strict less-than; a report resolved exactly 24 hours
/// ago is already hidden.
pub const VISIBILITY_WINDOW_HOURS: i64 = 24;

/// Timestamp format written by this application (microsecond precision).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Report lifecycle status.
///
/// Transitions are triggered only by the admin review flow and are not
/// ordered; any status is directly settable, including reopening a
/// resolved report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Pending,
    InProgress,
    Resolved,
}

impl Status {
    /// The label stored in the database and shown in forms.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Status::Pending),
            "In Progress" => Some(Status::InProgress),
            "Resolved" => Some(Status::Resolved),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a fresh report id: the first 8 hex characters of a v4 UUID.
///
/// Short enough for a citizen to write down, random enough that concurrent
/// submissions do not collide in practice.
pub fn new_report_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Format a timestamp the way this application persists them.
pub fn format_timestamp(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a persisted timestamp.
///
/// Two textual forms exist in the wild: with fractional seconds (rows
/// written by the application) and without (rows defaulted by the database).
/// Anything else returns None.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Decide whether a single report appears on the public map.
///
/// Unresolved reports are always visible. Resolved reports are visible only
/// while `now - updated_at` is strictly under the 24 hour window; a resolved
/// report with a missing or unparseable `updated_at` is hidden (fail safe:
/// hide on ambiguity rather than show).
pub fn is_publicly_visible(report: &reports::Model, now: NaiveDateTime) -> bool {
    if report.status != Status::Resolved.as_str() {
        return true;
    }

    let updated_at = match report.updated_at.as_deref().and_then(parse_timestamp) {
        Some(t) => t,
        None => return false,
    };

    now.signed_duration_since(updated_at) < chrono::Duration::hours(VISIBILITY_WINDOW_HOURS)
}

/// Apply the visibility filter to a full set of reports.
pub fn filter_visible(all: Vec<reports::Model>, now: NaiveDateTime) -> Vec<reports::Model> {
    all.into_iter()
        .filter(|r| is_publicly_visible(r, now))
        .collect()
}

/// Fields supplied by the citizen submission form.
pub struct NewReport {
    pub id: String,
    pub description: String,
    pub location_name: String,
    pub severity: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_path: String,
}

/// Dashboard summary counts.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

/// Insert one new report row.
///
/// Status defaults to Pending, `updated_at` stays null until the first admin
/// edit, and `created_at` is set to the current local time.
pub async fn create_report(
    db: &DatabaseConnection,
    new: NewReport,
) -> Result<reports::Model, DbErr> {
    let model = reports::ActiveModel {
        id: Set(new.id),
        description: Set(new.description),
        location_name: Set(new.location_name),
        severity: Set(new.severity),
        latitude: Set(new.latitude),
        longitude: Set(new.longitude),
        image_path: Set(new.image_path),
        status: Set(Status::Pending.as_str().to_string()),
        cleanup_image_path: Set(None),
        created_at: Set(format_timestamp(chrono::Local::now().naive_local())),
        updated_at: Set(None),
        ai_confidence: Set(None),
    };

    model.insert(db).await
}

/// Find a single report by id.
pub async fn find_report(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<reports::Model>, DbErr> {
    reports::Entity::find_by_id(id.to_string()).one(db).await
}

/// All reports, newest first.
pub async fn all_reports(db: &DatabaseConnection) -> Result<Vec<reports::Model>, DbErr> {
    reports::Entity::find()
        .order_by_desc(reports::Column::CreatedAt)
        .all(db)
        .await
}

/// The `n` most recently created reports.
pub async fn latest_reports(
    db: &DatabaseConnection,
    n: u64,
) -> Result<Vec<reports::Model>, DbErr> {
    reports::Entity::find()
        .order_by_desc(reports::Column::CreatedAt)
        .limit(n)
        .all(db)
        .await
}

/// Count reports per status for the admin dashboard.
pub async fn status_counts(db: &DatabaseConnection) -> Result<StatusCounts, DbErr> {
    let count_for = |status: Status| {
        reports::Entity::find()
            .filter(reports::Column::Status.eq(status.as_str()))
            .count(db)
    };

    Ok(StatusCounts {
        total: reports::Entity::find().count(db).await?,
        pending: count_for(Status::Pending).await?,
        in_progress: count_for(Status::InProgress).await?,
        resolved: count_for(Status::Resolved).await?,
    })
}

/// Apply an admin edit to a report.
///
/// `updated_at` is set to now unconditionally, even when the submitted
/// status equals the stored one. When a cleanup image filename is supplied
/// it is written in the same update; otherwise `cleanup_image_path` is left
/// untouched. Returns None when the id does not exist.
pub async fn update_status(
    db: &DatabaseConnection,
    id: &str,
    status: Status,
    cleanup_image: Option<String>,
) -> Result<Option<reports::Model>, DbErr> {
    let report = match find_report(db, id).await? {
        Some(report) => report,
        None => return Ok(None),
    };

    let now = format_timestamp(chrono::Local::now().naive_local());

    let mut active: reports::ActiveModel = report.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Some(now));
    if let Some(filename) = cleanup_image {
        active.cleanup_image_path = Set(Some(filename));
    }

    active.update(db).await.map(Some)
}

/// Delete a report by id, returning whether a row was removed.
///
/// Not reachable from the request path; used only by the versioned schema
/// migration that removes one known-bad row.
pub async fn delete_report(db: &DatabaseConnection, id: &str) -> Result<bool, DbErr> {
    let result = reports::Entity::delete_many()
        .filter(reports::Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn report(status: &str, updated_at: Option<&str>) -> reports::Model {
        reports::Model {
            id: "abcd1234".to_string(),
            description: "tires dumped by the creek".to_string(),
            location_name: "Miller Creek".to_string(),
            severity: "high".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            image_path: "abcd1234_tires.jpg".to_string(),
            status: status.to_string(),
            cleanup_image_path: None,
            created_at: "2026-01-01 08:00:00".to_string(),
            updated_at: updated_at.map(str::to_string),
            ai_confidence: None,
        }
    }

    fn now() -> NaiveDateTime {
        parse_timestamp("2026-01-10 12:00:00").unwrap()
    }

    #[test]
    fn test_pending_always_visible() {
        assert!(is_publicly_visible(&report("Pending", None), now()));
        assert!(is_publicly_visible(
            &report("Pending", Some("not a timestamp")),
            now()
        ));
    }

    #[test]
    fn test_in_progress_always_visible() {
        assert!(is_publicly_visible(&report("In Progress", None), now()));
    }

    #[test]
    fn test_resolved_without_updated_at_hidden() {
        assert!(!is_publicly_visible(&report("Resolved", None), now()));
    }

    #[test]
    fn test_resolved_within_window_visible() {
        let fresh = format_timestamp(now() - Duration::hours(1));
        assert!(is_publicly_visible(
            &report("Resolved", Some(&fresh)),
            now()
        ));
    }

    #[test]
    fn test_resolved_past_window_hidden() {
        let old = format_timestamp(now() - Duration::hours(25));
        assert!(!is_publicly_visible(&report("Resolved", Some(&old)), now()));
    }

    #[test]
    fn test_window_boundary_is_strict() {
        // Exactly 24 hours is already hidden; one second inside is visible.
        let exact = format_timestamp(now() - Duration::hours(24));
        assert!(!is_publicly_visible(
            &report("Resolved", Some(&exact)),
            now()
        ));

        let just_inside = format_timestamp(now() - Duration::hours(24) + Duration::seconds(1));
        assert!(is_publicly_visible(
            &report("Resolved", Some(&just_inside)),
            now()
        ));
    }

    #[test]
    fn test_resolved_with_garbage_timestamp_hidden() {
        assert!(!is_publicly_visible(
            &report("Resolved", Some("yesterday-ish")),
            now()
        ));
        assert!(!is_publicly_visible(&report("Resolved", Some("")), now()));
    }

    #[test]
    fn test_parse_timestamp_both_formats() {
        use chrono::Timelike;

        let with_micros = parse_timestamp("2026-01-10 12:30:00.123456").unwrap();
        assert_eq!(with_micros.nanosecond(), 123_456_000);

        let without = parse_timestamp("2026-01-10 12:30:00").unwrap();
        assert_eq!(without.nanosecond(), 0);

        assert!(parse_timestamp("10/01/2026 12:30").is_none());
    }

    #[test]
    fn test_format_round_trips() {
        let t = now();
        assert_eq!(parse_timestamp(&format_timestamp(t)).unwrap(), t);
    }

    #[test]
    fn test_filter_visible() {
        let visible = filter_visible(
            vec![
                report("Pending", None),
                report("Resolved", None),
                report(
                    "Resolved",
                    Some(&format_timestamp(now() - Duration::hours(1))),
                ),
            ],
            now(),
        );
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_new_report_id_shape() {
        let id = new_report_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, new_report_id());
    }

    #[test]
    fn test_status_labels_round_trip() {
        for status in [Status::Pending, Status::InProgress, Status::Resolved] {
            assert_eq!(Status::from_str(status.as_str()), Some(status));
        }
        assert_eq!(Status::from_str("Closed"), None);
        assert_eq!(Status::from_str("pending"), None);
    }
}
