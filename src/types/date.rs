//! Date converter.

use super::{Converter, NormalizedType, Value, names, render_chrono};
use crate::db::platform::Platform;
use crate::error::{DbError, DbResult};
use chrono::NaiveDate;

/// Converts calendar dates using the platform's date format.
///
/// Registered as both `date` and `date_immutable`; chrono dates are plain
/// values, so the two only differ by identifier.
#[derive(Debug, Clone)]
pub struct DateType {
    name: String,
}

impl DateType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn mutable() -> Self {
        Self::new(names::DATE)
    }

    pub fn immutable() -> Self {
        Self::new(names::DATE_IMMUTABLE)
    }
}

impl Converter for DateType {
    fn name(&self) -> &str {
        &self.name
    }

    fn normalized_type(&self) -> NormalizedType {
        NormalizedType::Date
    }

    fn format(&self, platform: &Platform) -> String {
        platform.date_format.clone()
    }

    fn to_storage(&self, value: &Value, platform: &Platform) -> DbResult<Option<String>> {
        match value {
            Value::Null => Ok(None),
            Value::Date(date) => {
                let format = &platform.date_format;
                render_chrono(date.format(format), &self.name, value.kind(), format).map(Some)
            }
            other => Err(DbError::invalid_type(
                &self.name,
                other.kind(),
                &["null", "date"],
            )),
        }
    }

    fn from_storage(&self, value: &Value, platform: &Platform) -> DbResult<Value> {
        match value {
            Value::Null | Value::Date(_) => Ok(value.clone()),
            Value::Text(raw) => NaiveDate::parse_from_str(raw, &platform.date_format)
                .map(Value::Date)
                .map_err(|_| DbError::invalid_format(&self.name, raw, &platform.date_format)),
            other => Err(DbError::invalid_type(
                &self.name,
                other.kind(),
                &["null", "date", "string"],
            )),
        }
    }
}
