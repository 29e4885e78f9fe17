//! Change-set models for ALTER TABLE compilation.
//!
//! A change-set groups the requested column mutations of one table. Groups
//! keep insertion order so the compiled DDL is deterministic.

use crate::types::NormalizedType;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Kind of a change-set operation group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Add,
    Remove,
    Rename,
    Change,
    /// Rename of the whole table
    Name,
}

impl ChangeKind {
    /// Order in which groups are validated and compiled.
    pub const ORDER: [ChangeKind; 5] = [
        ChangeKind::Add,
        ChangeKind::Remove,
        ChangeKind::Rename,
        ChangeKind::Change,
        ChangeKind::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Rename => "rename",
            Self::Change => "change",
            Self::Name => "name",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor-neutral column definition used by `add`, `change` and `rename`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub column_type: NormalizedType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub notnull: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub autoincrement: bool,
    /// Decimal precision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Decimal scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

impl ColumnSpec {
    /// Create a nullable column spec of the given type.
    pub fn new(column_type: NormalizedType) -> Self {
        Self {
            column_type,
            length: None,
            fixed: false,
            unsigned: false,
            notnull: false,
            default: None,
            autoincrement: false,
            precision: None,
            scale: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    pub fn with_notnull(mut self, notnull: bool) -> Self {
        self.notnull = notnull;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_autoincrement(mut self, autoincrement: bool) -> Self {
        self.autoincrement = autoincrement;
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}

/// Target of a column rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameSpec {
    pub name: String,
    pub definition: ColumnSpec,
}

/// Structured description of the schema mutations of one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// New name for the table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub add: IndexMap<String, ColumnSpec>,
    #[serde(default)]
    pub remove: IndexSet<String>,
    #[serde(default)]
    pub rename: IndexMap<String, RenameSpec>,
    #[serde(default)]
    pub change: IndexMap<String, ColumnSpec>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new column. A second entry with the same name replaces the first.
    pub fn add_column(mut self, name: impl Into<String>, spec: ColumnSpec) -> Self {
        self.add.insert(name.into(), spec);
        self
    }

    /// Remove a column.
    pub fn remove_column(mut self, name: impl Into<String>) -> Self {
        self.remove.insert(name.into());
        self
    }

    /// Rename a column, redefining it at the same time.
    pub fn rename_column(
        mut self,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
        definition: ColumnSpec,
    ) -> Self {
        self.rename.insert(
            old_name.into(),
            RenameSpec {
                name: new_name.into(),
                definition,
            },
        );
        self
    }

    /// Redefine an existing column.
    pub fn change_column(mut self, name: impl Into<String>, spec: ColumnSpec) -> Self {
        self.change.insert(name.into(), spec);
        self
    }

    /// Rename the table itself.
    pub fn rename_table(mut self, new_name: impl Into<String>) -> Self {
        self.name = Some(new_name.into());
        self
    }

    /// Whether the group of the given kind carries any entry.
    pub fn has(&self, kind: ChangeKind) -> bool {
        match kind {
            ChangeKind::Add => !self.add.is_empty(),
            ChangeKind::Remove => !self.remove.is_empty(),
            ChangeKind::Rename => !self.rename.is_empty(),
            ChangeKind::Change => !self.change.is_empty(),
            ChangeKind::Name => self.name.is_some(),
        }
    }

    /// Present groups, in validation order.
    pub fn kinds(&self) -> Vec<ChangeKind> {
        ChangeKind::ORDER
            .into_iter()
            .filter(|kind| self.has(*kind))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_follow_validation_order() {
        let changes = ChangeSet::new()
            .rename_table("people")
            .change_column("name", ColumnSpec::new(NormalizedType::Text))
            .remove_column("age")
            .add_column("email", ColumnSpec::new(NormalizedType::Text));

        assert_eq!(
            changes.kinds(),
            vec![
                ChangeKind::Add,
                ChangeKind::Remove,
                ChangeKind::Change,
                ChangeKind::Name
            ]
        );
    }

    #[test]
    fn test_empty_change_set() {
        assert!(ChangeSet::new().is_empty());
        assert!(!ChangeSet::new().remove_column("a").is_empty());
    }

    #[test]
    fn test_remove_is_a_set() {
        let changes = ChangeSet::new().remove_column("a").remove_column("a");
        assert_eq!(changes.remove.len(), 1);
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "add": {"quota": {"column_type": "integer", "unsigned": true}},
            "remove": ["file_limit", "time_limit"]
        }"#;
        let changes: ChangeSet = serde_json::from_str(json).unwrap();
        assert_eq!(changes.add["quota"].column_type, NormalizedType::Integer);
        assert!(changes.add["quota"].unsigned);
        assert_eq!(changes.remove.len(), 2);
        assert_eq!(changes.kinds(), vec![ChangeKind::Add, ChangeKind::Remove]);
    }
}
