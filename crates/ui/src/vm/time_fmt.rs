use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// `"—"` when there is no value to show.
#[must_use]
pub fn format_optional_datetime(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "—".to_string(), format_datetime)
}
