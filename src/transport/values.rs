//! Value normalisation applied to parameters before they reach a mutation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use crate::error::{LinearError, Result};
use crate::responses::JsonObject;
use crate::transport::filter::is_unset;

/// Drop every `null` and `""` entry. `false`, `0` and empty arrays are kept.
pub fn clean_object(object: &JsonObject) -> JsonObject {
    object
        .iter()
        .filter(|(_, value)| !is_unset(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Normalise a user supplied date into the ISO 8601 form Linear expects
/// (`2024-01-01T00:00:00.000Z`).
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), a bare
/// `YYYY-MM-DD`, or epoch milliseconds.
pub fn format_date_for_linear(input: &str) -> Result<String> {
    let input = input.trim();

    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        Utc.from_utc_datetime(&naive)
    } else if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
    } else if let Ok(millis) = input.parse::<i64>() {
        DateTime::from_timestamp_millis(millis).ok_or_else(|| invalid_date(input))?
    } else {
        return Err(invalid_date(input));
    };

    Ok(parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Parse a JSON string value; anything that is not valid JSON stays as it was.
pub fn parse_json_string(value: Value) -> Value {
    match value {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}

fn invalid_date(input: &str) -> LinearError {
    LinearError::InvalidParameter {
        name: "date".to_string(),
        reason: format!("`{input}` is not a recognised date"),
    }
}
