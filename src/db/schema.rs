//! Schema introspection module.
//!
//! Issues the platform's catalog queries through a [`QueryExecutor`] and
//! normalizes the raw rows into vendor-neutral descriptors.
//!
//! # Architecture
//!
//! SQL lives in the platform's [`CatalogQueries`](crate::db::platform::CatalogQueries);
//! this module only renders, fetches and normalizes. Row normalization is a
//! pure function (`normalize_column_row`) so it can be tested without a
//! database.

use crate::config::SchemaOptions;
use crate::db::executor::QueryExecutor;
use crate::db::platform::Platform;
use crate::db::types::JsonRow;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnDescriptor, IndexDescriptor, TableDescriptor};
use crate::types::TypeRegistry;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Schema inspector for catalog introspection.
///
/// Holds only borrowed, read-only collaborators; every listing is
/// independent and may run concurrently with others.
pub struct SchemaInspector<'a, E: QueryExecutor> {
    executor: &'a E,
    platform: &'a Platform,
    registry: &'a TypeRegistry,
    options: &'a SchemaOptions,
}

impl<'a, E: QueryExecutor> SchemaInspector<'a, E> {
    pub fn new(
        executor: &'a E,
        platform: &'a Platform,
        registry: &'a TypeRegistry,
        options: &'a SchemaOptions,
    ) -> Self {
        Self {
            executor,
            platform,
            registry,
            options,
        }
    }

    /// List user tables, ordered by name.
    ///
    /// `database` selects the catalog on dialects that support it; SQL Server
    /// and SQLite always list the connected database.
    pub async fn list_tables(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        let sql = self
            .platform
            .render_catalog(self.platform.catalog.tables, None, database);
        let tables = self.fetch_names("tables", &sql).await?;
        debug!(count = tables.len(), database = ?database, "Listed tables");
        Ok(tables)
    }

    /// List the columns of a table, keyed by column name in catalog order.
    pub async fn list_table_columns(
        &self,
        table: &str,
    ) -> DbResult<IndexMap<String, ColumnDescriptor>> {
        let sql = self
            .platform
            .render_catalog(self.platform.catalog.columns, Some(table), None);
        let rows = self
            .executor
            .fetch_assoc(&sql)
            .await
            .map_err(|e| DbError::catalog_query(format!("columns of table '{}'", table), &sql, e))?;

        let mut columns = IndexMap::with_capacity(rows.len());
        for row in &rows {
            match normalize_column_row(self.platform, self.registry, row) {
                Some(column) => {
                    columns.insert(column.name.clone(), column);
                }
                None => warn!(table = %table, row = ?row, "Skipping catalog row without column name"),
            }
        }

        debug!(table = %table, count = columns.len(), "Listed table columns");
        Ok(columns)
    }

    /// List the indexes of a table, excluding those backing the primary key.
    ///
    /// Primary-key names are compared by exact, case-sensitive match.
    pub async fn list_table_indexes(&self, table: &str) -> DbResult<Vec<IndexDescriptor>> {
        let object = format!("indexes of table '{}'", table);
        let sql = self
            .platform
            .render_catalog(self.platform.catalog.indexes, Some(table), None);
        let rows = self
            .executor
            .fetch_assoc(&sql)
            .await
            .map_err(|e| DbError::catalog_query(&object, &sql, e))?;

        let pk_sql = self
            .platform
            .render_catalog(self.platform.catalog.primary_keys, Some(table), None);
        let primary_keys: Vec<String> = self
            .executor
            .fetch_column(&pk_sql, Some("pk_name"))
            .await
            .map_err(|e| DbError::catalog_query(format!("primary key of table '{}'", table), &pk_sql, e))?
            .iter()
            .filter_map(json_text)
            .filter(|name| !name.is_empty())
            .collect();

        let indexes: Vec<IndexDescriptor> = group_index_rows(&rows)
            .into_iter()
            .filter(|(name, _)| !primary_keys.contains(name))
            .filter_map(|(name, (unique, mut columns))| {
                columns.sort_by_key(|(position, _)| *position);
                let columns = columns.into_iter().map(|(_, column)| column).collect();
                IndexDescriptor::new(self.fix_index_name(&name), columns, unique)
            })
            .collect();

        debug!(table = %table, count = indexes.len(), "Listed table indexes");
        Ok(indexes)
    }

    /// List sequence names.
    ///
    /// On dialects that emulate sequences with tables this lists every user
    /// table; names matching the sequence name format are reduced to the
    /// logical sequence name, the others are returned unchanged.
    pub async fn list_sequences(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        let sql = self
            .platform
            .render_catalog(self.platform.catalog.sequences, None, database);
        let sequences: Vec<String> = self
            .fetch_names("sequences", &sql)
            .await?
            .iter()
            .map(|name| self.fix_sequence_name(name))
            .collect();
        debug!(count = sequences.len(), "Listed sequences");
        Ok(sequences)
    }

    pub async fn list_views(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        let sql = self
            .platform
            .render_catalog(self.platform.catalog.views, None, database);
        let views = self.fetch_names("views", &sql).await?;
        debug!(count = views.len(), "Listed views");
        Ok(views)
    }

    pub async fn list_triggers(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        let sql = self
            .platform
            .render_catalog(self.platform.catalog.triggers, None, database);
        let triggers = self.fetch_names("triggers", &sql).await?;
        debug!(count = triggers.len(), "Listed triggers");
        Ok(triggers)
    }

    /// List triggers attached to a table.
    pub async fn list_table_triggers(&self, table: &str) -> DbResult<Vec<String>> {
        let sql = self
            .platform
            .render_catalog(self.platform.catalog.table_triggers, Some(table), None);
        let triggers = self
            .fetch_names(&format!("triggers of table '{}'", table), &sql)
            .await?;
        debug!(table = %table, count = triggers.len(), "Listed table triggers");
        Ok(triggers)
    }

    /// List views that read from a table.
    pub async fn list_table_views(&self, table: &str) -> DbResult<Vec<String>> {
        let sql = self
            .platform
            .render_catalog(self.platform.catalog.table_views, Some(table), None);
        let views = self
            .fetch_names(&format!("views of table '{}'", table), &sql)
            .await?;
        debug!(table = %table, count = views.len(), "Listed table views");
        Ok(views)
    }

    /// Columns and indexes of one table.
    pub async fn describe_table(&self, table: &str) -> DbResult<TableDescriptor> {
        let columns = self.list_table_columns(table).await?;
        let indexes = self.list_table_indexes(table).await?;
        Ok(TableDescriptor {
            name: table.to_string(),
            columns,
            indexes,
        })
    }

    /// Reduce a physical sequence name to its logical name.
    pub fn fix_sequence_name(&self, name: &str) -> String {
        strip_name_format(&self.options.seqname_format, name)
    }

    /// Reduce a physical index name to its logical name.
    pub fn fix_index_name(&self, name: &str) -> String {
        strip_name_format(&self.options.idxname_format, name)
    }

    /// Fetch the first column of a catalog query as non-empty strings.
    async fn fetch_names(&self, object: &str, sql: &str) -> DbResult<Vec<String>> {
        let values = self
            .executor
            .fetch_column(sql, None)
            .await
            .map_err(|e| DbError::catalog_query(object, sql, e))?;
        Ok(values
            .iter()
            .filter_map(json_text)
            .filter(|name| !name.is_empty())
            .collect())
    }
}

/// Grouped index rows: name -> (unique, [(position, column)]), in first-seen order.
type IndexGroups = IndexMap<String, (bool, Vec<(i64, String)>)>;

fn group_index_rows(rows: &[JsonRow]) -> IndexGroups {
    let mut groups = IndexGroups::new();
    for (row_no, row) in rows.iter().enumerate() {
        let row = lowercase_keys(row);
        let Some(name) = row.get("index_name").and_then(|v| json_text(v)) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let Some(column) = row.get("column_name").and_then(|v| json_text(v)) else {
            continue;
        };
        let position = row
            .get("seq_in_index")
            .and_then(|v| json_i64(v))
            .unwrap_or(row_no as i64);
        let unique = match row.get("non_unique").copied() {
            Some(JsonValue::Bool(non_unique)) => !non_unique,
            Some(value) => json_i64(value) == Some(0),
            None => false,
        };
        groups
            .entry(name)
            .or_insert_with(|| (unique, Vec::new()))
            .1
            .push((position, column));
    }
    groups
}

/// Normalize one column row of the catalog.
///
/// Returns `None` for rows without a column name. Never fails otherwise:
/// unknown types normalize to `Unsupported` and a missing length of a
/// variable-length type becomes `(max)`.
pub(crate) fn normalize_column_row(
    platform: &Platform,
    registry: &TypeRegistry,
    row: &JsonRow,
) -> Option<ColumnDescriptor> {
    let row = lowercase_keys(row);
    let name = row.get("column_name").and_then(|v| json_text(v))?;
    if name.is_empty() {
        return None;
    }

    let type_name = row
        .get("type_name")
        .and_then(|v| json_text(v))
        .unwrap_or_default();
    let type_name = type_name.trim();
    let (base, suffix) = match type_name.split_once(' ') {
        Some((base, suffix)) => (base, suffix.trim()),
        None => (type_name, ""),
    };

    let declared_length = row.get("length").and_then(|v| json_u32(v));
    let takes_length = platform.takes_length(base) && !base.contains('(');
    let native = if takes_length {
        match declared_length {
            Some(length) => format!("{}({})", base, length),
            None => format!("{}(max)", base),
        }
    } else {
        base.to_string()
    };

    let descriptor = registry.resolve_native(platform, &native);
    let length = descriptor.length.or(if takes_length || descriptor.fixed {
        declared_length
    } else {
        None
    });

    let notnull = row
        .get("is_nullable")
        .and_then(|v| json_text(v))
        .is_some_and(|flag| flag.trim() == platform.not_null_sentinel);
    let default = row.get("column_def").and_then(|v| json_text(v));

    Some(ColumnDescriptor {
        name,
        column_type: descriptor.normalized,
        native_type: native,
        alltypes: descriptor.alltypes,
        length,
        fixed: descriptor.fixed,
        unsigned: suffix.eq_ignore_ascii_case("unsigned"),
        notnull,
        default,
        primary: suffix.eq_ignore_ascii_case(&platform.identity_marker),
    })
}

/// Strip a `prefix%ssuffix` name format, matching case-insensitively.
///
/// Names that do not match, or whose logical part would contain anything but
/// ASCII letters, digits and `_`, are returned unchanged.
fn strip_name_format(format: &str, name: &str) -> String {
    let Some((prefix, suffix)) = format.split_once("%s") else {
        return name.to_string();
    };
    if name.len() <= prefix.len() + suffix.len() {
        return name.to_string();
    }
    let head = name.get(..prefix.len());
    let tail = name.get(name.len() - suffix.len()..);
    let (Some(head), Some(tail)) = (head, tail) else {
        return name.to_string();
    };
    if !head.eq_ignore_ascii_case(prefix) || !tail.eq_ignore_ascii_case(suffix) {
        return name.to_string();
    }
    let logical = &name[prefix.len()..name.len() - suffix.len()];
    if logical
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        logical.to_string()
    } else {
        name.to_string()
    }
}

fn lowercase_keys(row: &JsonRow) -> HashMap<String, &JsonValue> {
    row.iter()
        .map(|(key, value)| (key.to_ascii_lowercase(), value))
        .collect()
}

fn json_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        other => Some(other.to_string()),
    }
}

fn json_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_u32(value: &JsonValue) -> Option<u32> {
    json_i64(value).and_then(|n| u32::try_from(n).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NormalizedType;
    use serde_json::json;

    fn row(value: JsonValue) -> JsonRow {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn normalize(value: JsonValue) -> Option<ColumnDescriptor> {
        normalize_column_row(
            &Platform::sqlserver(),
            &TypeRegistry::with_defaults(),
            &row(value),
        )
    }

    #[test]
    fn test_normalize_varchar_with_length() {
        let column = normalize(json!({
            "COLUMN_NAME": "name",
            "TYPE_NAME": "varchar",
            "LENGTH": 50,
            "IS_NULLABLE": "YES",
            "COLUMN_DEF": null
        }))
        .unwrap();
        assert_eq!(column.name, "name");
        assert_eq!(column.native_type, "varchar(50)");
        assert_eq!(column.column_type, NormalizedType::Text);
        assert_eq!(column.length, Some(50));
        assert!(!column.notnull);
        assert!(!column.primary);
        assert!(column.default.is_none());
    }

    #[test]
    fn test_normalize_identity_column() {
        let column = normalize(json!({
            "column_name": "id",
            "type_name": "int identity",
            "length": 4,
            "is_nullable": "NO",
            "column_def": null
        }))
        .unwrap();
        assert_eq!(column.native_type, "int");
        assert_eq!(column.column_type, NormalizedType::Integer);
        assert!(column.notnull);
        assert!(column.primary);
        assert_eq!(column.length, None);
    }

    #[test]
    fn test_normalize_identity_marker_is_case_insensitive() {
        let column = normalize(json!({
            "column_name": "id",
            "type_name": "bigint IDENTITY",
            "is_nullable": "NO "
        }))
        .unwrap();
        assert!(column.primary);
        assert!(column.notnull);
    }

    #[test]
    fn test_normalize_missing_length_falls_back_to_max() {
        for length in [json!(null), json!("n/a")] {
            let column = normalize(json!({
                "column_name": "notes",
                "type_name": "varchar",
                "length": length,
                "is_nullable": "YES"
            }))
            .unwrap();
            assert_eq!(column.native_type, "varchar(max)");
            assert_eq!(column.column_type, NormalizedType::Text);
            assert_eq!(column.length, None);
        }
    }

    #[test]
    fn test_normalize_unknown_type_is_unsupported() {
        let column = normalize(json!({
            "column_name": "shape",
            "type_name": "geography",
            "is_nullable": "YES"
        }))
        .unwrap();
        assert_eq!(column.column_type, NormalizedType::Unsupported);
    }

    #[test]
    fn test_normalize_unsigned_suffix() {
        let column = normalize_column_row(
            &Platform::mysql(),
            &TypeRegistry::with_defaults(),
            &row(json!({"column_name": "quota", "type_name": "int unsigned", "is_nullable": "YES"})),
        )
        .unwrap();
        assert!(column.unsigned);
        assert!(!column.primary);
    }

    #[test]
    fn test_normalize_parenthesized_type() {
        let column = normalize_column_row(
            &Platform::sqlite(),
            &TypeRegistry::with_defaults(),
            &row(json!({"column_name": "code", "type_name": "CHAR(3)", "length": null, "is_nullable": "NO"})),
        )
        .unwrap();
        assert_eq!(column.column_type, NormalizedType::Text);
        assert_eq!(column.length, Some(3));
        assert!(column.fixed);
    }

    #[test]
    fn test_normalize_row_without_name() {
        assert!(normalize(json!({"type_name": "int"})).is_none());
        assert!(normalize(json!({"column_name": "", "type_name": "int"})).is_none());
    }

    #[test]
    fn test_group_index_rows_orders_by_position() {
        let rows = vec![
            row(json!({"INDEX_NAME": "ix_name", "COLUMN_NAME": "last", "NON_UNIQUE": 1, "SEQ_IN_INDEX": 2})),
            row(json!({"INDEX_NAME": null, "COLUMN_NAME": null, "NON_UNIQUE": null, "SEQ_IN_INDEX": null})),
            row(json!({"INDEX_NAME": "ix_name", "COLUMN_NAME": "first", "NON_UNIQUE": 1, "SEQ_IN_INDEX": 1})),
            row(json!({"INDEX_NAME": "ux_email", "COLUMN_NAME": "email", "NON_UNIQUE": 0, "SEQ_IN_INDEX": 1})),
        ];
        let groups = group_index_rows(&rows);
        assert_eq!(groups.len(), 2);
        let (unique, columns) = &groups["ix_name"];
        assert!(!unique);
        assert_eq!(columns.len(), 2);
        assert!(groups["ux_email"].0);
    }

    #[test]
    fn test_strip_name_format() {
        assert_eq!(strip_name_format("%s_seq", "users_seq"), "users");
        assert_eq!(strip_name_format("%s_seq", "USERS_SEQ"), "USERS");
        assert_eq!(strip_name_format("%s_seq", "users"), "users");
        assert_eq!(strip_name_format("%s_seq", "_seq"), "_seq");
        assert_eq!(strip_name_format("%s_idx", "email_idx"), "email");
        assert_eq!(strip_name_format("%s_idx", "my index_idx"), "my index_idx");
        assert_eq!(strip_name_format("seq_%s", "seq_orders"), "orders");
    }

    #[test]
    fn test_json_helpers() {
        assert_eq!(json_text(&json!(12)), Some("12".to_string()));
        assert_eq!(json_text(&JsonValue::Null), None);
        assert_eq!(json_i64(&json!(" 7 ")), Some(7));
        assert_eq!(json_u32(&json!(-1)), None);
    }
}
