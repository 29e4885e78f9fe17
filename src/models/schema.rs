//! Schema-related data models.
//!
//! This module defines the vendor-neutral descriptors produced by schema
//! introspection. All descriptors are immutable values handed to the caller.

use crate::types::NormalizedType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Normalized type, always derived from `native_type`
    pub column_type: NormalizedType,
    /// Native type including declared length (e.g., `varchar(50)`)
    pub native_type: String,
    /// Every normalized type the native type may stand for, preferred first
    pub alltypes: Vec<NormalizedType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    pub fixed: bool,
    pub unsigned: bool,
    pub notnull: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Identity column (SQL Server `identity`, MySQL `auto_increment`, ...)
    pub primary: bool,
}

impl ColumnDescriptor {
    /// Create a nullable column descriptor without a default.
    pub fn new(
        name: impl Into<String>,
        column_type: NormalizedType,
        native_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
            native_type: native_type.into(),
            alltypes: vec![column_type],
            length: None,
            fixed: false,
            unsigned: false,
            notnull: false,
            default: None,
            primary: false,
        }
    }

    /// Set the declared length.
    pub fn with_length(mut self, length: Option<u32>) -> Self {
        self.length = length;
        self
    }

    /// Set the NOT NULL flag.
    pub fn with_notnull(mut self, notnull: bool) -> Self {
        self.notnull = notnull;
        self
    }

    /// Set the default value expression as reported by the catalog.
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }

    /// Set whether this is the identity column.
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    /// Never empty
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexDescriptor {
    /// Create an index descriptor. Returns `None` when `columns` is empty.
    pub fn new(name: impl Into<String>, columns: Vec<String>, unique: bool) -> Option<Self> {
        if columns.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            columns,
            unique,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDescriptor {
    pub name: String,
    pub start: i64,
    pub increment: i64,
}

impl SequenceDescriptor {
    /// Create a sequence descriptor; the increment is always 1.
    pub fn new(name: impl Into<String>, start: i64) -> Self {
        Self {
            name: name.into(),
            start,
            increment: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: IndexMap<String, ColumnDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
}

impl TableDescriptor {
    /// Create an empty table descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            indexes: Vec::new(),
        }
    }

    /// Add a column, replacing any previous column with the same name.
    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.insert(column.name.clone(), column);
        self
    }

    /// Add an index.
    pub fn with_index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(name)
    }

    /// Names of the identity columns, in declaration order.
    pub fn primary_columns(&self) -> Vec<&str> {
        self.columns
            .values()
            .filter(|c| c.primary)
            .map(|c| c.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_descriptor_requires_columns() {
        assert!(IndexDescriptor::new("idx_empty", vec![], false).is_none());
        let idx = IndexDescriptor::new("idx_email", vec!["email".to_string()], true).unwrap();
        assert!(idx.unique);
        assert_eq!(idx.columns, vec!["email"]);
    }

    #[test]
    fn test_sequence_increment_is_one() {
        let seq = SequenceDescriptor::new("orders_seq", 5);
        assert_eq!(seq.start, 5);
        assert_eq!(seq.increment, 1);
    }

    #[test]
    fn test_table_descriptor_builder() {
        let table = TableDescriptor::new("users")
            .with_column(
                ColumnDescriptor::new("id", NormalizedType::Integer, "int")
                    .with_notnull(true)
                    .with_primary(true),
            )
            .with_column(
                ColumnDescriptor::new("name", NormalizedType::Text, "varchar(50)")
                    .with_length(Some(50)),
            );

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.primary_columns(), vec!["id"]);
        assert_eq!(table.column("name").unwrap().length, Some(50));
        // Insertion order is preserved
        let names: Vec<_> = table.columns.keys().cloned().collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_column_descriptor_serialization_skips_empty_fields() {
        let col = ColumnDescriptor::new("flag", NormalizedType::Boolean, "bit");
        let json = serde_json::to_string(&col).unwrap();
        assert!(!json.contains("\"default\""));
        assert!(!json.contains("\"length\""));
        assert!(json.contains("\"column_type\":\"boolean\""));
    }
}
