use chrono::{DateTime, SecondsFormat, Utc};

/// Current time in UTC.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format a UTC timestamp as RFC 3339 with millisecond precision.
pub fn to_rfc3339(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
