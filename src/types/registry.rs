//! Registry of value converters keyed by type identifier.

use super::{
    Converter, DateIntervalType, DateTimeType, DateType, TypeDescriptor, Value,
};
use crate::db::platform::Platform;
use crate::error::{DbError, DbResult};
use indexmap::IndexMap;
use std::sync::Arc;

/// Builder collecting converters before the registry is frozen.
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    converters: IndexMap<String, Arc<dyn Converter>>,
}

impl TypeRegistryBuilder {
    /// Register a converter under its own name. A later registration with the
    /// same (case-insensitive) name replaces the earlier one.
    pub fn register(mut self, converter: impl Converter + 'static) -> Self {
        let key = converter.name().to_ascii_lowercase();
        self.converters.insert(key, Arc::new(converter));
        self
    }

    /// Register the built-in date, date-time and interval converters.
    pub fn with_builtin_types(self) -> Self {
        self.register(DateType::mutable())
            .register(DateType::immutable())
            .register(DateTimeType::mutable())
            .register(DateTimeType::immutable())
            .register(DateIntervalType)
    }

    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            converters: self.converters,
        }
    }
}

/// Immutable mapping from type identifier to converter.
///
/// Lookups are case-insensitive. The registry has no interior mutability and
/// can be shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    converters: IndexMap<String, Arc<dyn Converter>>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Registry holding the built-in converters.
    pub fn with_defaults() -> Self {
        Self::builder().with_builtin_types().build()
    }

    /// Look up a converter by identifier.
    pub fn get(&self, name: &str) -> DbResult<&dyn Converter> {
        self.converters
            .get(&name.to_ascii_lowercase())
            .map(|c| c.as_ref())
            .ok_or_else(|| DbError::unknown_type(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.converters.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered identifiers in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.converters.keys().map(String::as_str).collect()
    }

    pub fn to_storage(
        &self,
        name: &str,
        value: &Value,
        platform: &Platform,
    ) -> DbResult<Option<String>> {
        self.get(name)?.to_storage(value, platform)
    }

    pub fn from_storage(&self, name: &str, value: &Value, platform: &Platform) -> DbResult<Value> {
        self.get(name)?.from_storage(value, platform)
    }

    /// Resolve a native column type name into a [`TypeDescriptor`].
    ///
    /// Never fails: names the platform does not know resolve to
    /// [`NormalizedType::Unsupported`](super::NormalizedType::Unsupported).
    /// Parenthesized arguments such as `varchar(50)` are parsed into `length`.
    pub fn resolve_native(&self, platform: &Platform, native: &str) -> TypeDescriptor {
        let trimmed = native.trim();
        let (base, args) = match trimmed.split_once('(') {
            Some((base, rest)) => (base.trim(), Some(rest.trim_end_matches(')').trim())),
            None => (trimmed, None),
        };
        let base = base.to_ascii_lowercase();

        let normalized = platform.normalize_type(&base);
        let length = args
            .and_then(|a| a.split(',').next())
            .and_then(|a| a.trim().parse::<u32>().ok());
        let format = self
            .converters
            .values()
            .find(|c| c.normalized_type() == normalized)
            .map(|c| c.format(platform));

        TypeDescriptor {
            alltypes: vec![normalized],
            fixed: platform.is_fixed_length(&base),
            unsigned: false,
            native: base,
            normalized,
            format,
            length,
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbErrorKind;
    use crate::types::{DateInterval, INTERVAL_FORMAT, NormalizedType, names};

    #[test]
    fn test_defaults_registered() {
        let registry = TypeRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec![
                names::DATE,
                names::DATE_IMMUTABLE,
                names::DATETIME,
                names::DATETIME_IMMUTABLE,
                names::DATEINTERVAL
            ]
        );
        assert!(registry.has("DateTime"));
        assert!(!registry.has("uuid"));
    }

    #[test]
    fn test_unknown_type() {
        let registry = TypeRegistry::with_defaults();
        let err = registry.get("geometry").unwrap_err();
        assert_eq!(err.kind(), DbErrorKind::UnknownType);

        let err = registry
            .to_storage("geometry", &Value::Null, &Platform::sqlserver())
            .unwrap_err();
        assert_eq!(err.kind(), DbErrorKind::UnknownType);
    }

    #[test]
    fn test_registration_replaces_same_name() {
        let registry = TypeRegistry::builder()
            .register(DateType::mutable())
            .register(DateType::new("DATE"))
            .build();
        assert_eq!(registry.names(), vec!["date"]);
    }

    #[test]
    fn test_conversion_by_name() {
        let registry = TypeRegistry::with_defaults();
        let platform = Platform::postgres();
        let interval = DateInterval::new(0, 0, 1, 0, 0, 0);
        let stored = registry
            .to_storage(names::DATEINTERVAL, &interval.into(), &platform)
            .unwrap();
        assert_eq!(stored.as_deref(), Some("+P00Y00M01DT00H00M00S"));
        let restored = registry
            .from_storage(names::DATEINTERVAL, &stored.into(), &platform)
            .unwrap();
        assert_eq!(restored, Value::Interval(interval));
    }

    #[test]
    fn test_resolve_varchar_with_length() {
        let registry = TypeRegistry::with_defaults();
        let descriptor = registry.resolve_native(&Platform::sqlserver(), "varchar(50)");
        assert_eq!(descriptor.native, "varchar");
        assert_eq!(descriptor.normalized, NormalizedType::Text);
        assert_eq!(descriptor.normalized.to_string(), "text");
        assert_eq!(descriptor.length, Some(50));
        assert!(!descriptor.fixed);
        assert!(descriptor.format.is_none());
    }

    #[test]
    fn test_resolve_is_total() {
        let registry = TypeRegistry::with_defaults();
        for platform in [
            Platform::sqlserver(),
            Platform::postgres(),
            Platform::mysql(),
            Platform::sqlite(),
        ] {
            for native in ["", "   ", "no_such_type", "(", "varchar(max)", "INT"] {
                let first = registry.resolve_native(&platform, native);
                let second = registry.resolve_native(&platform, native);
                assert_eq!(first, second);
            }
            let unknown = registry.resolve_native(&platform, "no_such_type");
            assert_eq!(unknown.normalized, NormalizedType::Unsupported);
        }
    }

    #[test]
    fn test_resolve_attaches_converter_format() {
        let registry = TypeRegistry::with_defaults();
        let platform = Platform::sqlserver();

        let datetime = registry.resolve_native(&platform, "DATETIME");
        assert_eq!(datetime.normalized, NormalizedType::DateTime);
        assert_eq!(datetime.format.as_deref(), Some("%Y-%m-%d %H:%M:%S%.f"));

        let date = registry.resolve_native(&platform, "date");
        assert_eq!(date.format.as_deref(), Some("%Y-%m-%d"));

        let char_type = registry.resolve_native(&platform, "nchar(10)");
        assert!(char_type.fixed);
        assert_eq!(char_type.length, Some(10));

        let interval = TypeRegistry::with_defaults()
            .get(names::DATEINTERVAL)
            .unwrap()
            .format(&platform);
        assert_eq!(interval, INTERVAL_FORMAT);
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeRegistry>();
    }
}
