//! Submission rate cap: the fourth report from one origin inside the
//! window is rejected regardless of form content.

use dumpwatch::app_config::AppConfig;
use dumpwatch::rate_limit::{
    check_report_rate_limit, init_rate_limits, RateLimiter,
};
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn test_fourth_submission_from_same_origin_blocked() {
    init_rate_limits(&AppConfig::default());

    // Default cap: 3 per 10 minutes per IP.
    for i in 0..3 {
        assert!(
            check_report_rate_limit("203.0.113.10").is_ok(),
            "submission {} should be allowed",
            i + 1
        );
    }

    let result = check_report_rate_limit("203.0.113.10");
    assert!(result.is_err(), "4th submission should be blocked");
    assert!(result.unwrap_err().retry_after_seconds > 0);
}

#[test]
#[serial]
fn test_other_origins_unaffected() {
    init_rate_limits(&AppConfig::default());

    for _ in 0..3 {
        check_report_rate_limit("203.0.113.20").unwrap();
    }
    assert!(check_report_rate_limit("203.0.113.20").is_err());

    // A different origin still has its full allowance.
    assert!(check_report_rate_limit("203.0.113.21").is_ok());
}

#[test]
fn test_window_expiry_restores_allowance() {
    let limiter = RateLimiter::new();

    for _ in 0..3 {
        limiter
            .check_rate_limit("report", "203.0.113.30", 3, Duration::from_millis(50))
            .unwrap();
    }
    assert!(limiter
        .check_rate_limit("report", "203.0.113.30", 3, Duration::from_millis(50))
        .is_err());

    std::thread::sleep(Duration::from_millis(60));

    assert!(
        limiter
            .check_rate_limit("report", "203.0.113.30", 3, Duration::from_millis(50))
            .is_ok(),
        "allowance returns once the window slides past"
    );
}
