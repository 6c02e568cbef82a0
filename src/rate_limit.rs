//! Rate limiting for report submissions.
//!
//! Sliding window rate limiting using in-memory storage (DashMap), keyed on
//! the client network address. Suitable for single-instance deployments.
//! Limits are configurable and support hot reload; the check runs before any
//! submission business logic, so an over-limit client never reaches the
//! CAPTCHA step.

use arc_swap::ArcSwap;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::AppConfig;

/// Global rate limiter instance
pub static RATE_LIMITER: Lazy<Arc<RateLimiter>> = Lazy::new(|| Arc::new(RateLimiter::new()));

/// Global rate limit configuration (hot-reloadable)
static RATE_LIMIT_CONFIG: Lazy<ArcSwap<RateLimitConfig>> =
    Lazy::new(|| ArcSwap::from_pointee(RateLimitConfig::default()));

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Report submissions per window per IP
    pub report_max: usize,
    pub report_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            report_max: 3,
            report_window: Duration::from_secs(600), // 10 minutes
        }
    }
}

impl RateLimitConfig {
    /// Load rate limit configuration from application settings
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            report_max: config.rate_limit.report_max_requests as usize,
            report_window: Duration::from_secs(config.rate_limit.report_window_seconds as u64),
        }
    }
}

/// Initialize rate limits from config (call at startup)
pub fn init_rate_limits(config: &AppConfig) {
    RATE_LIMIT_CONFIG.store(Arc::new(RateLimitConfig::from_config(config)));
    log::info!("Rate limit configuration initialized");
}

/// Reload rate limits from config (call when settings change)
pub fn reload_rate_limits(config: &AppConfig) {
    RATE_LIMIT_CONFIG.store(Arc::new(RateLimitConfig::from_config(config)));
    log::info!("Rate limit configuration reloaded");
}

/// Get the current rate limit configuration
pub fn get_rate_limit_config() -> Arc<RateLimitConfig> {
    RATE_LIMIT_CONFIG.load_full()
}

/// Rate limiter using in-memory storage
pub struct RateLimiter {
    /// Map of (action:identifier) -> request timestamps
    requests: DashMap<String, Vec<Instant>>,
}

/// Error returned when rate limit is exceeded
#[derive(Debug, Clone)]
pub struct RateLimitError {
    /// Number of seconds until the rate limit resets
    pub retry_after_seconds: u64,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    /// Check if a request should be rate limited.
    ///
    /// Returns `Ok(())` and records the request when allowed, or
    /// `Err(RateLimitError)` when the window is full.
    pub fn check_rate_limit(
        &self,
        action: &str,
        identifier: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), RateLimitError> {
        let key = format!("{}:{}", action, identifier);
        let now = Instant::now();

        let mut entry = self.requests.entry(key).or_default();

        // Remove requests outside the time window (sliding window)
        entry.retain(|&timestamp| now.duration_since(timestamp) < window);

        if entry.len() >= max_requests {
            // How long until the oldest request expires. A zero limit has no
            // oldest request and waits out the full window.
            let retry_after = entry
                .first()
                .map(|&oldest| window.saturating_sub(now.duration_since(oldest)))
                .unwrap_or(window);

            return Err(RateLimitError {
                retry_after_seconds: retry_after.as_secs() + 1, // Round up
            });
        }

        entry.push(now);

        Ok(())
    }

    /// Drop timestamps older than `window` and remove entries left empty,
    /// so one-off clients do not accumulate forever.
    pub fn cleanup_old_entries(&self, window: Duration) {
        let now = Instant::now();
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&timestamp| now.duration_since(timestamp) < window);
            !timestamps.is_empty()
        });
    }

    /// Get the current request count for a specific action/identifier
    pub fn get_request_count(&self, action: &str, identifier: &str, window: Duration) -> u32 {
        let key = format!("{}:{}", action, identifier);
        let now = Instant::now();

        if let Some(entry) = self.requests.get(&key) {
            entry
                .iter()
                .filter(|&&timestamp| now.duration_since(timestamp) < window)
                .count() as u32
        } else {
            0
        }
    }

    /// Clear all requests for a specific action/identifier
    pub fn clear_requests(&self, action: &str, identifier: &str) {
        let key = format!("{}:{}", action, identifier);
        self.requests.remove(&key);
    }

    /// Get the number of tracked keys (for monitoring/debugging)
    pub fn tracked_keys_count(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check rate limit for report submissions.
///
/// Keyed per client IP; the default limit is 3 submissions per 10 minutes.
pub fn check_report_rate_limit(ip: &str) -> Result<(), RateLimitError> {
    let config = get_rate_limit_config();
    RATE_LIMITER.check_rate_limit("report", ip, config.report_max, config.report_window)
}

/// Periodic cleanup entry point for the background task spawned at startup.
pub fn cleanup_old_entries_public() {
    let config = get_rate_limit_config();
    RATE_LIMITER.cleanup_old_entries(config.report_window);
}
