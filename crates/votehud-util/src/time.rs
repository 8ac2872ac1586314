//! Time utilities for votehud
//!
//! Everything time-related in votehud is expressed in wall-clock epoch
//! milliseconds: the vote endpoint reports reset timestamps that way and the
//! preferences file stores the compass timer start the same way.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `VOTEHUD_MOCK_TIME` environment variable can be set
//! to override the system time. The mock clock advances at the real rate from
//! the given starting point.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! VOTEHUD_MOCK_TIME="2025-12-25 14:30:00" cargo run -p votehud -- --username Steve
//! ```

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "VOTEHUD_MOCK_TIME";

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// Milliseconds in one minute
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Milliseconds in one hour
pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Cached offset between mock time and real time at process start.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                return parse_mock_offset(&mock_time_str, Local::now());
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Compute the offset of a mock time string relative to `real_now`.
fn parse_mock_offset(mock_time_str: &str, real_now: DateTime<Local>) -> Option<chrono::Duration> {
    let Ok(naive_dt) = NaiveDateTime::parse_from_str(mock_time_str, "%Y-%m-%d %H:%M:%S") else {
        tracing::warn!(
            mock_time = %mock_time_str,
            expected_format = "%Y-%m-%d %H:%M:%S",
            "Invalid mock time format"
        );
        return None;
    };

    let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() else {
        tracing::warn!(
            mock_time = %mock_time_str,
            "Failed to convert mock time to local timezone"
        );
        return None;
    };

    let offset = mock_dt.signed_duration_since(real_now);
    tracing::info!(
        mock_time = %mock_time_str,
        offset_secs = offset.num_seconds(),
        "Mock time enabled"
    );
    Some(offset)
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Current wall-clock time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> EpochMillis {
    now().timestamp_millis()
}

/// Format a millisecond span as a `MM:SS` countdown.
///
/// Minutes are not wrapped into hours, so two hours reads `120:00`.
/// Negative spans are treated as zero.
pub fn format_countdown(millis: i64) -> String {
    let millis = millis.max(0);
    let minutes = millis / MILLIS_PER_MINUTE;
    let seconds = (millis / 1000) % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Format an epoch timestamp for log output.
pub fn format_epoch_millis(millis: EpochMillis) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("@{}ms", millis),
    }
}
