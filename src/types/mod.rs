//! Type conversion registry.
//!
//! Converters turn application values into the textual representation a
//! platform stores, and back. The registry is built once, then shared
//! read-only (usually behind an `Arc`) by every component that converts values.
//!
//! # Architecture
//!
//! - [`NormalizedType`] is the closed, platform-independent classification of
//!   column data.
//! - [`Value`] is the application-side value handed to converters.
//! - [`Converter`] is the single capability every registered type implements.
//! - [`TypeRegistry`] maps type identifiers to converters and resolves native
//!   column type names into [`TypeDescriptor`]s.

mod date;
mod datetime;
mod interval;
mod registry;

pub use date::DateType;
pub use datetime::DateTimeType;
pub use interval::{DateInterval, DateIntervalType, INTERVAL_FORMAT};
pub use registry::{TypeRegistry, TypeRegistryBuilder};

use crate::db::platform::Platform;
use crate::error::DbResult;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Type identifiers of the built-in converters.
pub mod names {
    pub const DATE: &str = "date";
    pub const DATE_IMMUTABLE: &str = "date_immutable";
    pub const DATETIME: &str = "datetime";
    pub const DATETIME_IMMUTABLE: &str = "datetime_immutable";
    pub const DATEINTERVAL: &str = "dateinterval";
}

/// Platform-independent classification of column data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedType {
    Integer,
    Decimal,
    Float,
    Text,
    Boolean,
    Date,
    DateTime,
    Time,
    Interval,
    Blob,
    /// Fallback for native types the platform does not map
    Unsupported,
}

impl NormalizedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Interval => "interval",
            Self::Blob => "blob",
            Self::Unsupported => "unsupported",
        }
    }

    /// Whether default values of this type are rendered without quotes.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Decimal | Self::Float | Self::Boolean
        )
    }
}

impl std::fmt::Display for NormalizedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized view of a native column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    /// Lowercase native base type (e.g., `varchar`)
    pub native: String,
    pub normalized: NormalizedType,
    /// Preferred type first
    pub alltypes: Vec<NormalizedType>,
    /// Serialization template of the converter handling this type, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    pub fixed: bool,
    pub unsigned: bool,
}

/// Application-side value passed to and returned from converters.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Interval(DateInterval),
}

impl Value {
    /// Short name of the value's runtime kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Interval(_) => "dateinterval",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::Text).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateInterval> for Value {
    fn from(value: DateInterval) -> Self {
        Value::Interval(value)
    }
}

/// Bidirectional converter between application values and storage strings.
///
/// Implementations must be pure: the result depends only on the value and the
/// platform's format strings, so converters can be called concurrently.
pub trait Converter: Send + Sync + std::fmt::Debug {
    /// Type identifier this converter is registered under.
    fn name(&self) -> &str;

    /// Normalized type of the columns this converter handles.
    fn normalized_type(&self) -> NormalizedType;

    /// Serialization template used for the given platform.
    fn format(&self, platform: &Platform) -> String;

    /// Convert an application value into its storage representation.
    fn to_storage(&self, value: &Value, platform: &Platform) -> DbResult<Option<String>>;

    /// Convert a storage representation back into an application value.
    fn from_storage(&self, value: &Value, platform: &Platform) -> DbResult<Value>;
}

/// Render a chrono value with a platform format without panicking on bad formats.
pub(crate) fn render_chrono(
    item: impl std::fmt::Display,
    type_name: &str,
    value_kind: &str,
    format: &str,
) -> DbResult<String> {
    use std::fmt::Write;

    let mut out = String::new();
    write!(out, "{}", item)
        .map_err(|_| crate::error::DbError::invalid_format(type_name, value_kind, format))?;
    Ok(out)
}
