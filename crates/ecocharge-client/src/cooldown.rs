//! Login cooldown after the API rate-limits sign-in attempts.

use chrono::{DateTime, Duration, Utc};

/// Cooldown applied when a 429 carries no usable `Retry-After`.
pub const DEFAULT_LOGIN_COOLDOWN_SECS: u64 = 60;

/// Longest cooldown honoured from a `Retry-After` header.
pub const MAX_LOGIN_COOLDOWN_SECS: u64 = 15 * 60;

/// Parse `Retry-After` as delta-seconds or an HTTP date.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<u64> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|at| (at.with_timezone(&Utc) - now).num_seconds().max(0).unsigned_abs())
}

/// Instant until which login stays blocked.
pub fn cooldown_until(retry_after: Option<u64>, now: DateTime<Utc>) -> DateTime<Utc> {
    let secs = retry_after
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_LOGIN_COOLDOWN_SECS)
        .min(MAX_LOGIN_COOLDOWN_SECS);
    now + Duration::seconds(secs as i64)
}

/// Whole seconds left, rounded up; `None` once the cooldown has passed.
pub fn remaining_secs(until: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    let left = (until - now).num_milliseconds();
    if left <= 0 {
        None
    } else {
        Some((left as u64).div_ceil(1000))
    }
}
