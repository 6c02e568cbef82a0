//! Public visibility of reports: everything unresolved, plus reports
//! resolved less than 24 hours ago.

mod common;

use common::database::setup_test_database;
use common::fixtures::insert_report;
use dumpwatch::reports::{filter_visible, format_timestamp};

#[actix_rt::test]
async fn test_resolved_reports_expire_after_24_hours() {
    let db = setup_test_database().await;

    let now = chrono::Local::now().naive_local();
    let old = format_timestamp(now - chrono::Duration::hours(25));
    let fresh = format_timestamp(now - chrono::Duration::hours(1));

    // A: resolved 25 hours ago, should be hidden.
    insert_report(&db, "aaaa0001", "Resolved", "2026-01-01 08:00:00", Some(&old)).await;
    // B: resolved an hour ago, should be visible.
    insert_report(
        &db,
        "bbbb0002",
        "Resolved",
        "2026-01-01 09:00:00",
        Some(&fresh),
    )
    .await;
    // C: pending with no update, should be visible.
    insert_report(&db, "cccc0003", "Pending", "2026-01-01 10:00:00", None).await;

    let all = dumpwatch::reports::all_reports(&db).await.unwrap();
    assert_eq!(all.len(), 3);

    let visible = filter_visible(all, now);
    let ids: Vec<&str> = visible.iter().map(|r| r.id.as_str()).collect();

    assert!(!ids.contains(&"aaaa0001"), "25h-old resolved must be hidden");
    assert!(ids.contains(&"bbbb0002"), "1h-old resolved must be visible");
    assert!(ids.contains(&"cccc0003"), "pending must be visible");
}

#[actix_rt::test]
async fn test_resolved_without_updated_at_is_hidden() {
    let db = setup_test_database().await;

    // Resolved before the updated_at column existed.
    insert_report(&db, "dddd0004", "Resolved", "2026-01-01 08:00:00", None).await;
    insert_report(&db, "eeee0005", "In Progress", "2026-01-01 09:00:00", None).await;

    let now = chrono::Local::now().naive_local();
    let visible = filter_visible(dumpwatch::reports::all_reports(&db).await.unwrap(), now);
    let ids: Vec<&str> = visible.iter().map(|r| r.id.as_str()).collect();

    assert_eq!(ids, vec!["eeee0005"]);
}

#[actix_rt::test]
async fn test_unparseable_updated_at_is_hidden() {
    let db = setup_test_database().await;

    insert_report(
        &db,
        "ffff0006",
        "Resolved",
        "2026-01-01 08:00:00",
        Some("last tuesday"),
    )
    .await;

    let now = chrono::Local::now().naive_local();
    let visible = filter_visible(dumpwatch::reports::all_reports(&db).await.unwrap(), now);
    assert!(visible.is_empty());
}

#[actix_rt::test]
async fn test_both_timestamp_formats_accepted() {
    let db = setup_test_database().await;

    let now = chrono::Local::now().naive_local();
    // Fractional seconds, as written by the application.
    let with_micros = format_timestamp(now - chrono::Duration::hours(2));
    // Plain seconds, as written by database defaults.
    let plain = (now - chrono::Duration::hours(3))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    insert_report(
        &db,
        "abab0007",
        "Resolved",
        "2026-01-01 08:00:00",
        Some(&with_micros),
    )
    .await;
    insert_report(
        &db,
        "cdcd0008",
        "Resolved",
        "2026-01-01 09:00:00",
        Some(&plain),
    )
    .await;

    let visible = filter_visible(dumpwatch::reports::all_reports(&db).await.unwrap(), now);
    assert_eq!(visible.len(), 2);
}
