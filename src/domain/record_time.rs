use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use super::record::DeviceRecord;

/// Which field a record's time was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    Timestamp,
    OnOffTime,
    Epoch,
}

/// The time a record describes.
///
/// Resolution order is `timestamp`, then `on_off_time`, then the Unix epoch.
/// A field that is present but cannot be parsed counts as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordTime {
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub source: TimeSource,
}

impl RecordTime {
    pub const EPOCH: RecordTime = RecordTime {
        at: OffsetDateTime::UNIX_EPOCH,
        source: TimeSource::Epoch,
    };

    pub fn resolve(record: &DeviceRecord) -> Self {
        if let Some(at) = record.timestamp.as_ref().and_then(parse_time) {
            return Self {
                at,
                source: TimeSource::Timestamp,
            };
        }
        if let Some(at) = record.on_off_time.as_ref().and_then(parse_time) {
            return Self {
                at,
                source: TimeSource::OnOffTime,
            };
        }
        Self::EPOCH
    }

    pub fn is_epoch(&self) -> bool {
        self.source == TimeSource::Epoch
    }

    /// Minutes elapsed between this time and `now`; negative for future times.
    pub fn minutes_before(&self, now: OffsetDateTime) -> f64 {
        (now - self.at).as_seconds_f64() / 60.0
    }
}

/// Parses a feed time value.
///
/// Strings may be RFC 3339, an ISO-8601 date-time without offset (read as
/// UTC), a bare date, or a number of epoch milliseconds. JSON numbers are
/// epoch milliseconds.
pub fn parse_time(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::String(s) => parse_str(s.trim()),
        Value::Number(n) => n.as_f64().and_then(from_epoch_millis),
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<OffsetDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(at) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(at);
    }
    let naive = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    for fmt in naive {
        if let Ok(at) = PrimitiveDateTime::parse(s, fmt) {
            return Some(at.assume_utc());
        }
    }
    if let Ok(day) = Date::parse(s, format_description!("[year]-[month]-[day]")) {
        return Some(day.midnight().assume_utc());
    }
    s.parse::<f64>().ok().and_then(from_epoch_millis)
}

fn from_epoch_millis(millis: f64) -> Option<OffsetDateTime> {
    if !millis.is_finite() {
        return None;
    }
    let nanos = (millis * 1_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}
