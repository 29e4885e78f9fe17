//! Date-time converter.

use super::{Converter, NormalizedType, Value, names, render_chrono};
use crate::db::platform::Platform;
use crate::error::{DbError, DbResult};
use chrono::{NaiveDateTime, NaiveTime, Utc};
use tracing::debug;

/// Converts timestamps without time zone using the platform's date-time format.
///
/// Parsing is two-staged: the strict platform format first, then a permissive
/// parse that accepts the variants DBMS drivers commonly return (ISO 8601,
/// RFC 3339 with offsets, missing fractional seconds, ...).
#[derive(Debug, Clone)]
pub struct DateTimeType {
    name: String,
}

impl DateTimeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn mutable() -> Self {
        Self::new(names::DATETIME)
    }

    pub fn immutable() -> Self {
        Self::new(names::DATETIME_IMMUTABLE)
    }

    fn parse_permissive(raw: &str) -> Option<NaiveDateTime> {
        dateparser::parse_with(raw, &Utc, NaiveTime::default())
            .ok()
            .map(|ts| ts.naive_utc())
    }
}

impl Converter for DateTimeType {
    fn name(&self) -> &str {
        &self.name
    }

    fn normalized_type(&self) -> NormalizedType {
        NormalizedType::DateTime
    }

    fn format(&self, platform: &Platform) -> String {
        platform.datetime_format.clone()
    }

    fn to_storage(&self, value: &Value, platform: &Platform) -> DbResult<Option<String>> {
        match value {
            Value::Null => Ok(None),
            Value::DateTime(ts) => {
                let format = &platform.datetime_format;
                render_chrono(ts.format(format), &self.name, value.kind(), format).map(Some)
            }
            other => Err(DbError::invalid_type(
                &self.name,
                other.kind(),
                &["null", "datetime"],
            )),
        }
    }

    fn from_storage(&self, value: &Value, platform: &Platform) -> DbResult<Value> {
        match value {
            Value::Null | Value::DateTime(_) => Ok(value.clone()),
            Value::Text(raw) => {
                if let Ok(ts) = NaiveDateTime::parse_from_str(raw, &platform.datetime_format) {
                    return Ok(Value::DateTime(ts));
                }
                debug!(value = %raw, format = %platform.datetime_format, "Strict datetime parse failed, trying permissive parse");
                Self::parse_permissive(raw)
                    .map(Value::DateTime)
                    .ok_or_else(|| {
                        DbError::invalid_format(&self.name, raw, &platform.datetime_format)
                    })
            }
            other => Err(DbError::invalid_type(
                &self.name,
                other.kind(),
                &["null", "datetime", "string"],
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbErrorKind;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_micro_opt(h, mi, s, micro)
            .unwrap()
    }

    #[test]
    fn test_to_storage_uses_platform_format() {
        let value = Value::DateTime(ts(2024, 1, 2, 3, 4, 5, 120));
        let stored = DateTimeType::mutable()
            .to_storage(&value, &Platform::sqlserver())
            .unwrap();
        assert_eq!(stored.as_deref(), Some("2024-01-02 03:04:05.000120"));
    }

    #[test]
    fn test_to_storage_rejects_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err = DateTimeType::immutable()
            .to_storage(&Value::Date(date), &Platform::sqlserver())
            .unwrap_err();
        assert_eq!(err.kind(), DbErrorKind::InvalidType);
        assert!(err.to_string().contains("null, datetime"));
    }

    #[test]
    fn test_from_storage_strict_format() {
        let parsed = DateTimeType::mutable()
            .from_storage(
                &Value::from("2024-01-02 03:04:05.000120"),
                &Platform::sqlserver(),
            )
            .unwrap();
        assert_eq!(parsed, Value::DateTime(ts(2024, 1, 2, 3, 4, 5, 120)));
    }

    #[test]
    fn test_from_storage_falls_back_to_permissive_parse() {
        let converter = DateTimeType::immutable();
        let platform = Platform::sqlserver();

        // RFC 3339 is outside the strict format
        let parsed = converter
            .from_storage(&Value::from("2024-01-02T03:04:05Z"), &platform)
            .unwrap();
        assert_eq!(parsed, Value::DateTime(ts(2024, 1, 2, 3, 4, 5, 0)));

        // RFC 3339 with offset is normalized to UTC
        let parsed = converter
            .from_storage(&Value::from("2024-01-02T05:04:05+02:00"), &platform)
            .unwrap();
        assert_eq!(parsed, Value::DateTime(ts(2024, 1, 2, 3, 4, 5, 0)));
    }

    #[test]
    fn test_from_storage_invalid_format() {
        let err = DateTimeType::mutable()
            .from_storage(&Value::from("not a timestamp"), &Platform::sqlserver())
            .unwrap_err();
        assert_eq!(err.kind(), DbErrorKind::InvalidFormat);
        assert!(err.to_string().contains("not a timestamp"));
        assert!(err.to_string().contains("%Y-%m-%d %H:%M:%S%.f"));
    }

    #[test]
    fn test_to_storage_keeps_nanoseconds() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_nano_opt(3, 4, 5, 123_456_789)
            .unwrap();
        let converter = DateTimeType::mutable();
        let platform = Platform::sqlserver();

        let stored = converter
            .to_storage(&Value::DateTime(at), &platform)
            .unwrap()
            .unwrap();
        assert_eq!(stored, "2024-01-02 03:04:05.123456789");
        assert_eq!(
            converter.from_storage(&Value::Text(stored), &platform).unwrap(),
            Value::DateTime(at)
        );
    }

    #[test]
    fn test_round_trip_all_platforms() {
        let converter = DateTimeType::mutable();
        let value = Value::DateTime(ts(2023, 10, 11, 23, 59, 58, 999_999));
        for platform in [
            Platform::sqlserver(),
            Platform::postgres(),
            Platform::mysql(),
            Platform::sqlite(),
        ] {
            let stored = converter.to_storage(&value, &platform).unwrap();
            let restored = converter.from_storage(&stored.into(), &platform).unwrap();
            assert_eq!(restored, value, "round trip on {}", platform.name());
        }
    }

    #[test]
    fn test_null_passes_through() {
        let converter = DateTimeType::mutable();
        let platform = Platform::sqlite();
        assert_eq!(converter.to_storage(&Value::Null, &platform).unwrap(), None);
        assert_eq!(
            converter.from_storage(&Value::Null, &platform).unwrap(),
            Value::Null
        );
    }
}
