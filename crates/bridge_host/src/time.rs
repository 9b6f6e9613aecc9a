//! Time helpers shared across host contracts and adapters.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};

/// Converts a filesystem timestamp to unix milliseconds, or `0` when it predates the epoch.
pub fn system_time_to_unix_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or_default()
}

/// Parses an event instant sent by the front end.
///
/// RFC 3339 instants are tried first; plain integers are read as unix milliseconds. Returns
/// `None` for anything else.
pub fn parse_event_instant_ms(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.timestamp_millis());
    }
    trimmed.parse::<i64>().ok()
}

/// Returns the process-local time-zone identifier.
///
/// Uses `TZ` when set, otherwise the current local UTC offset (for example `+01:00`).
pub fn local_time_zone_id() -> String {
    match std::env::var("TZ") {
        Ok(zone) if !zone.trim().is_empty() => zone.trim().to_string(),
        _ => Local::now().format("%:z").to_string(),
    }
}
