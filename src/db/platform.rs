//! Platform capability profiles.
//!
//! A [`Platform`] is static data describing one SQL dialect: identifier
//! quoting, date/time formats, the native type table, catalog query templates
//! and the handful of DDL fragments that differ between vendors.
//!
//! # Architecture
//!
//! Catalog SQL is organized in the `queries` submodule with constants for each
//! dialect. Templates use three placeholders, substituted by
//! [`Platform::render_catalog`]:
//!
//! - `{table}`: table name as a string literal
//! - `{table_ident}`: table name as a force-quoted identifier
//! - `{schema}`: database name as a string literal, or the dialect's
//!   current-database expression when none is given

use crate::error::{DbError, DbResult};
use crate::models::{ColumnSpec, Dialect};
use crate::types::NormalizedType;

/// How the clauses of one `ALTER TABLE` are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterStyle {
    /// One statement, clauses joined with `", "`
    Combined,
    /// One statement per clause (SQLite allows a single action per ALTER)
    PerClause,
}

/// Catalog query templates of one dialect.
///
/// Name listings return one column; `columns` rows are aliased to
/// `column_name, type_name, length, is_nullable, column_def`; `indexes` rows to
/// `index_name, column_name, non_unique, seq_in_index`; `primary_keys` rows to
/// `pk_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogQueries {
    pub tables: &'static str,
    pub columns: &'static str,
    pub indexes: &'static str,
    pub primary_keys: &'static str,
    pub sequences: &'static str,
    pub views: &'static str,
    pub triggers: &'static str,
    pub table_triggers: &'static str,
    pub table_views: &'static str,
}

/// Capability profile of one SQL dialect. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub dialect: Dialect,
    /// chrono format of DATE values
    pub date_format: String,
    /// chrono format of timestamp values
    pub datetime_format: String,
    pub time_format: String,
    /// `is_nullable` value meaning the column is NOT NULL
    pub not_null_sentinel: String,
    /// Type-name suffix marking an identity column
    pub identity_marker: String,
    pub catalog: CatalogQueries,
}

impl Platform {
    pub fn sqlserver() -> Self {
        Self {
            dialect: Dialect::SqlServer,
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S%.f".to_string(),
            time_format: "%H:%M:%S".to_string(),
            not_null_sentinel: "NO".to_string(),
            identity_marker: "identity".to_string(),
            catalog: queries::sqlserver::CATALOG,
        }
    }

    pub fn postgres() -> Self {
        Self {
            dialect: Dialect::PostgreSQL,
            catalog: queries::postgres::CATALOG,
            ..Self::sqlserver()
        }
    }

    pub fn mysql() -> Self {
        Self {
            dialect: Dialect::MySQL,
            catalog: queries::mysql::CATALOG,
            ..Self::sqlserver()
        }
    }

    pub fn sqlite() -> Self {
        Self {
            dialect: Dialect::SQLite,
            catalog: queries::sqlite::CATALOG,
            ..Self::sqlserver()
        }
    }

    /// Built-in profile of a dialect.
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::SqlServer => Self::sqlserver(),
            Dialect::PostgreSQL => Self::postgres(),
            Dialect::MySQL => Self::mysql(),
            Dialect::SQLite => Self::sqlite(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.dialect.display_name()
    }

    // =========================================================================
    // Quoting
    // =========================================================================

    /// Quote an identifier, doubling embedded closing quotes.
    ///
    /// Without `force`, plain identifiers (ASCII letters, digits and `_`, not
    /// starting with a digit) are returned unchanged.
    pub fn quote_identifier(&self, name: &str, force: bool) -> String {
        if !force && is_plain_identifier(name) {
            return name.to_string();
        }
        let (open, close) = match self.dialect {
            Dialect::SqlServer => ('[', ']'),
            Dialect::MySQL => ('`', '`'),
            Dialect::PostgreSQL | Dialect::SQLite => ('"', '"'),
        };
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(open);
        for ch in name.chars() {
            if ch == close {
                quoted.push(close);
            }
            quoted.push(ch);
        }
        quoted.push(close);
        quoted
    }

    /// Quote a string literal.
    pub fn quote_literal(&self, value: &str) -> String {
        let mut escaped = value.replace('\'', "''");
        if self.dialect == Dialect::MySQL {
            escaped = escaped.replace('\\', "\\\\");
        }
        format!("'{}'", escaped)
    }

    // =========================================================================
    // Native types
    // =========================================================================

    /// Map a lowercase native base type to its normalized type.
    pub fn normalize_type(&self, base: &str) -> NormalizedType {
        let base = base.trim().to_ascii_lowercase();
        let overrides: &[(&str, NormalizedType)] = match self.dialect {
            Dialect::SqlServer => &[("timestamp", NormalizedType::Blob), ("rowversion", NormalizedType::Blob)],
            Dialect::PostgreSQL => &[("interval", NormalizedType::Interval)],
            Dialect::MySQL => &[("year", NormalizedType::Integer)],
            Dialect::SQLite => &[],
        };
        overrides
            .iter()
            .chain(COMMON_TYPES)
            .find(|(native, _)| *native == base)
            .map(|(_, normalized)| *normalized)
            .unwrap_or(NormalizedType::Unsupported)
    }

    /// Whether the base type carries a declared length (variable-length text).
    pub fn takes_length(&self, base: &str) -> bool {
        matches!(
            base.trim().to_ascii_lowercase().as_str(),
            "varchar" | "nvarchar" | "character varying" | "varchar2"
        )
    }

    /// Whether the base type is a fixed-length character type.
    pub fn is_fixed_length(&self, base: &str) -> bool {
        matches!(
            base.trim().to_ascii_lowercase().as_str(),
            "char" | "nchar" | "bpchar" | "character"
        )
    }

    /// Native type of a column spec, without name or constraints.
    pub fn native_type_declaration(&self, spec: &ColumnSpec) -> DbResult<String> {
        let d = self.dialect;
        let native = match spec.column_type {
            NormalizedType::Integer => {
                let base = match d {
                    Dialect::SQLite | Dialect::PostgreSQL => "INTEGER",
                    _ => "INT",
                };
                if spec.unsigned && d == Dialect::MySQL {
                    format!("{} UNSIGNED", base)
                } else {
                    base.to_string()
                }
            }
            NormalizedType::Decimal => format!(
                "DECIMAL({},{})",
                spec.precision.unwrap_or(18),
                spec.scale.unwrap_or(0)
            ),
            NormalizedType::Float => match d {
                Dialect::SqlServer => "FLOAT",
                Dialect::PostgreSQL => "DOUBLE PRECISION",
                Dialect::MySQL => "DOUBLE",
                Dialect::SQLite => "REAL",
            }
            .to_string(),
            NormalizedType::Text => match spec.length {
                Some(length) if spec.fixed => format!("CHAR({})", length),
                Some(length) => format!("VARCHAR({})", length),
                None => "TEXT".to_string(),
            },
            NormalizedType::Boolean => match d {
                Dialect::SqlServer => "BIT",
                Dialect::MySQL => "TINYINT(1)",
                Dialect::PostgreSQL | Dialect::SQLite => "BOOLEAN",
            }
            .to_string(),
            NormalizedType::Date => "DATE".to_string(),
            NormalizedType::DateTime => match d {
                Dialect::SqlServer => "DATETIME2",
                Dialect::PostgreSQL => "TIMESTAMP",
                Dialect::MySQL => "DATETIME(6)",
                Dialect::SQLite => "DATETIME",
            }
            .to_string(),
            NormalizedType::Time => "TIME".to_string(),
            // Stored through the interval converter's text template
            NormalizedType::Interval => "VARCHAR(255)".to_string(),
            NormalizedType::Blob => match d {
                Dialect::SqlServer => "VARBINARY(MAX)",
                Dialect::PostgreSQL => "BYTEA",
                Dialect::MySQL => "LONGBLOB",
                Dialect::SQLite => "BLOB",
            }
            .to_string(),
            NormalizedType::Unsupported => {
                return Err(DbError::invalid_input(format!(
                    "Column type '{}' cannot be declared on {}",
                    spec.column_type,
                    self.name()
                )));
            }
        };
        Ok(native)
    }

    /// Fragment appended to auto-incrementing column declarations.
    pub fn identity_fragment(&self) -> &'static str {
        match self.dialect {
            Dialect::SqlServer => "IDENTITY",
            Dialect::PostgreSQL => "GENERATED BY DEFAULT AS IDENTITY",
            Dialect::MySQL => "AUTO_INCREMENT",
            Dialect::SQLite => "PRIMARY KEY AUTOINCREMENT",
        }
    }

    /// Boolean literal matching the native boolean column type.
    pub fn boolean_literal(&self, value: bool) -> &'static str {
        match (self.dialect, value) {
            (Dialect::SqlServer | Dialect::MySQL, true) => "1",
            (Dialect::SqlServer | Dialect::MySQL, false) => "0",
            (Dialect::PostgreSQL | Dialect::SQLite, true) => "TRUE",
            (Dialect::PostgreSQL | Dialect::SQLite, false) => "FALSE",
        }
    }

    // =========================================================================
    // DDL strategies
    // =========================================================================

    /// Keyword placed between `CREATE` and `TABLE` for temporary tables.
    pub fn temporary_table_keyword(&self) -> &'static str {
        match self.dialect {
            // Temporary tables are marked by a `#` name prefix instead
            Dialect::SqlServer => "",
            _ => "TEMPORARY",
        }
    }

    pub fn add_column_keyword(&self) -> &'static str {
        match self.dialect {
            Dialect::SqlServer => "ADD",
            _ => "ADD COLUMN",
        }
    }

    pub fn alter_style(&self) -> AlterStyle {
        match self.dialect {
            Dialect::SQLite => AlterStyle::PerClause,
            _ => AlterStyle::Combined,
        }
    }

    /// Create the structure backing a sequence, counting from 1.
    pub fn create_sequence_sql(&self, sequence: &str, column: &str) -> String {
        let seq = self.quote_identifier(sequence, true);
        let col = self.quote_identifier(column, true);
        match self.dialect {
            Dialect::SqlServer => format!(
                "CREATE TABLE {seq} ({col} INT PRIMARY KEY CLUSTERED IDENTITY(1, 1) NOT NULL)"
            ),
            Dialect::PostgreSQL => format!("CREATE SEQUENCE {seq} START WITH 1 INCREMENT BY 1"),
            Dialect::MySQL => format!(
                "CREATE TABLE {seq} ({col} BIGINT NOT NULL AUTO_INCREMENT, PRIMARY KEY ({col}))"
            ),
            Dialect::SQLite => {
                format!("CREATE TABLE {seq} ({col} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL)")
            }
        }
    }

    /// Move a freshly created sequence to `start`, overriding identity generation.
    ///
    /// Every dialect leaves `start` as the current value, so the next
    /// generated value is `start + 1`.
    pub fn seed_sequence_sql(&self, sequence: &str, column: &str, start: i64) -> String {
        let seq = self.quote_identifier(sequence, true);
        let col = self.quote_identifier(column, true);
        match self.dialect {
            Dialect::SqlServer => format!(
                "SET IDENTITY_INSERT {seq} ON INSERT INTO {seq} ({col}) VALUES ({start})"
            ),
            Dialect::PostgreSQL => {
                format!("SELECT setval({}, {start}, true)", self.quote_literal(&seq))
            }
            Dialect::MySQL | Dialect::SQLite => {
                format!("INSERT INTO {seq} ({col}) VALUES ({start})")
            }
        }
    }

    pub fn drop_sequence_sql(&self, sequence: &str) -> String {
        let seq = self.quote_identifier(sequence, true);
        match self.dialect {
            Dialect::PostgreSQL => format!("DROP SEQUENCE {seq}"),
            _ => format!("DROP TABLE {seq}"),
        }
    }

    /// `CREATE DATABASE`, with the storage device clause where supported.
    pub fn create_database_sql(
        &self,
        name: &str,
        device: Option<&str>,
        size: Option<&str>,
    ) -> DbResult<String> {
        let quoted = self.quote_identifier(name, true);
        match self.dialect {
            Dialect::SqlServer => {
                let mut sql = format!("CREATE DATABASE {quoted}");
                if let Some(device) = device.filter(|d| !d.is_empty()) {
                    sql.push_str(" ON ");
                    sql.push_str(device);
                    if let Some(size) = size.filter(|s| !s.is_empty()) {
                        sql.push('=');
                        sql.push_str(size);
                    }
                }
                Ok(sql)
            }
            Dialect::PostgreSQL | Dialect::MySQL => Ok(format!("CREATE DATABASE {quoted}")),
            Dialect::SQLite => Err(DbError::unsupported("create_database", self.name())),
        }
    }

    pub fn drop_database_sql(&self, name: &str) -> DbResult<String> {
        match self.dialect {
            Dialect::SQLite => Err(DbError::unsupported("drop_database", self.name())),
            _ => Ok(format!(
                "DROP DATABASE {}",
                self.quote_identifier(name, true)
            )),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Substitute the placeholders of a catalog query template.
    ///
    /// The template is scanned once, left to right; substituted values are
    /// never scanned again, so names containing placeholder text stay intact.
    /// Table placeholders are left as-is when `table` is `None`.
    pub fn render_catalog(
        &self,
        template: &str,
        table: Option<&str>,
        database: Option<&str>,
    ) -> String {
        let schema = match database {
            Some(db) => self.quote_literal(db),
            None => self.current_schema_expr().to_string(),
        };
        let substitutions = [
            ("{table_ident}", table.map(|t| self.quote_identifier(t, true))),
            ("{table}", table.map(|t| self.quote_literal(t))),
            ("{schema}", Some(schema)),
        ];

        let mut sql = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            sql.push_str(&rest[..open]);
            rest = &rest[open..];
            let hit = substitutions
                .iter()
                .find_map(|(placeholder, value)| match value {
                    Some(value) if rest.starts_with(placeholder) => {
                        Some((placeholder.len(), value))
                    }
                    _ => None,
                });
            match hit {
                Some((len, value)) => {
                    sql.push_str(value);
                    rest = &rest[len..];
                }
                None => {
                    sql.push('{');
                    rest = &rest[1..];
                }
            }
        }
        sql.push_str(rest);
        sql
    }

    fn current_schema_expr(&self) -> &'static str {
        match self.dialect {
            Dialect::MySQL => "DATABASE()",
            Dialect::PostgreSQL => "current_schema()",
            Dialect::SqlServer => "DB_NAME()",
            Dialect::SQLite => "'main'",
        }
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Native type names shared by the built-in dialects.
const COMMON_TYPES: &[(&str, NormalizedType)] = &[
    ("int", NormalizedType::Integer),
    ("integer", NormalizedType::Integer),
    ("smallint", NormalizedType::Integer),
    ("tinyint", NormalizedType::Integer),
    ("mediumint", NormalizedType::Integer),
    ("bigint", NormalizedType::Integer),
    ("int2", NormalizedType::Integer),
    ("int4", NormalizedType::Integer),
    ("int8", NormalizedType::Integer),
    ("serial", NormalizedType::Integer),
    ("bigserial", NormalizedType::Integer),
    ("decimal", NormalizedType::Decimal),
    ("numeric", NormalizedType::Decimal),
    ("money", NormalizedType::Decimal),
    ("smallmoney", NormalizedType::Decimal),
    ("float", NormalizedType::Float),
    ("real", NormalizedType::Float),
    ("double", NormalizedType::Float),
    ("double precision", NormalizedType::Float),
    ("float4", NormalizedType::Float),
    ("float8", NormalizedType::Float),
    ("char", NormalizedType::Text),
    ("nchar", NormalizedType::Text),
    ("bpchar", NormalizedType::Text),
    ("character", NormalizedType::Text),
    ("varchar", NormalizedType::Text),
    ("nvarchar", NormalizedType::Text),
    ("character varying", NormalizedType::Text),
    ("text", NormalizedType::Text),
    ("ntext", NormalizedType::Text),
    ("tinytext", NormalizedType::Text),
    ("mediumtext", NormalizedType::Text),
    ("longtext", NormalizedType::Text),
    ("clob", NormalizedType::Text),
    ("sysname", NormalizedType::Text),
    ("uniqueidentifier", NormalizedType::Text),
    ("uuid", NormalizedType::Text),
    ("json", NormalizedType::Text),
    ("jsonb", NormalizedType::Text),
    ("xml", NormalizedType::Text),
    ("enum", NormalizedType::Text),
    ("bit", NormalizedType::Boolean),
    ("bool", NormalizedType::Boolean),
    ("boolean", NormalizedType::Boolean),
    ("date", NormalizedType::Date),
    ("datetime", NormalizedType::DateTime),
    ("datetime2", NormalizedType::DateTime),
    ("smalldatetime", NormalizedType::DateTime),
    ("datetimeoffset", NormalizedType::DateTime),
    ("timestamp", NormalizedType::DateTime),
    ("timestamptz", NormalizedType::DateTime),
    ("time", NormalizedType::Time),
    ("timetz", NormalizedType::Time),
    ("binary", NormalizedType::Blob),
    ("varbinary", NormalizedType::Blob),
    ("image", NormalizedType::Blob),
    ("blob", NormalizedType::Blob),
    ("tinyblob", NormalizedType::Blob),
    ("mediumblob", NormalizedType::Blob),
    ("longblob", NormalizedType::Blob),
    ("bytea", NormalizedType::Blob),
];

// =============================================================================
// Catalog Query Templates
// =============================================================================

mod queries {
    pub mod sqlserver {
        use super::super::CatalogQueries;

        pub const CATALOG: CatalogQueries = CatalogQueries {
            tables: "SELECT name FROM sysobjects WHERE type = 'U' AND name <> 'dtproperties' ORDER BY name",
            columns: "EXEC sp_columns @table_name = {table_ident}",
            indexes: "EXEC sp_statistics @table_name = {table}",
            primary_keys: "EXEC sp_pkeys @table_name = {table}",
            sequences: "SELECT name FROM sysobjects WHERE xtype = 'U'",
            views: "SELECT name FROM sysobjects WHERE xtype = 'V'",
            triggers: "SELECT name FROM sysobjects WHERE xtype = 'TR'",
            table_triggers: "SELECT name FROM sysobjects WHERE xtype = 'TR' AND object_name(parent_obj) = {table}",
            table_views: r#"
                SELECT DISTINCT v.name
                FROM sys.views v
                JOIN sys.sql_expression_dependencies d ON d.referencing_id = v.object_id
                WHERE d.referenced_entity_name = {table}
                ORDER BY v.name
                "#,
        };
    }

    pub mod postgres {
        use super::super::CatalogQueries;

        pub const CATALOG: CatalogQueries = CatalogQueries {
            tables: r#"
                SELECT table_name::text
                FROM information_schema.tables
                WHERE table_schema = {schema} AND table_type = 'BASE TABLE'
                ORDER BY table_name
                "#,
            columns: r#"
                SELECT
                    column_name::text AS column_name,
                    udt_name::text ||
                        CASE WHEN is_identity = 'YES' OR column_default LIKE 'nextval(%'
                             THEN ' identity' ELSE '' END AS type_name,
                    character_maximum_length::int AS length,
                    is_nullable::text AS is_nullable,
                    column_default::text AS column_def
                FROM information_schema.columns
                WHERE table_name = {table} AND table_schema = current_schema()
                ORDER BY ordinal_position
                "#,
            indexes: r#"
                SELECT
                    i.relname::text AS index_name,
                    a.attname::text AS column_name,
                    CASE WHEN ix.indisunique THEN 0 ELSE 1 END AS non_unique,
                    array_position(ix.indkey::int2[], a.attnum)::int AS seq_in_index
                FROM pg_index ix
                JOIN pg_class t ON t.oid = ix.indrelid
                JOIN pg_class i ON i.oid = ix.indexrelid
                JOIN pg_namespace n ON n.oid = t.relnamespace
                JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
                WHERE t.relname = {table} AND n.nspname = current_schema()
                ORDER BY i.relname, seq_in_index
                "#,
            primary_keys: r#"
                SELECT constraint_name::text AS pk_name
                FROM information_schema.table_constraints
                WHERE table_name = {table}
                  AND table_schema = current_schema()
                  AND constraint_type = 'PRIMARY KEY'
                "#,
            sequences: r#"
                SELECT sequence_name::text
                FROM information_schema.sequences
                WHERE sequence_schema = {schema}
                ORDER BY sequence_name
                "#,
            views: r#"
                SELECT table_name::text
                FROM information_schema.views
                WHERE table_schema = {schema}
                ORDER BY table_name
                "#,
            triggers: r#"
                SELECT DISTINCT trigger_name::text
                FROM information_schema.triggers
                WHERE trigger_schema = {schema}
                ORDER BY trigger_name
                "#,
            table_triggers: r#"
                SELECT DISTINCT trigger_name::text
                FROM information_schema.triggers
                WHERE event_object_table = {table} AND trigger_schema = current_schema()
                ORDER BY trigger_name
                "#,
            table_views: r#"
                SELECT DISTINCT view_name::text
                FROM information_schema.view_table_usage
                WHERE table_name = {table} AND view_schema = current_schema()
                ORDER BY view_name
                "#,
        };
    }

    pub mod mysql {
        use super::super::CatalogQueries;

        pub const CATALOG: CatalogQueries = CatalogQueries {
            tables: r#"
                SELECT TABLE_NAME AS table_name
                FROM information_schema.TABLES
                WHERE TABLE_SCHEMA = {schema} AND TABLE_TYPE = 'BASE TABLE'
                ORDER BY TABLE_NAME
                "#,
            columns: r#"
                SELECT
                    COLUMN_NAME AS column_name,
                    CONCAT(DATA_TYPE,
                        CASE
                            WHEN EXTRA LIKE '%auto_increment%' THEN ' identity'
                            WHEN COLUMN_TYPE LIKE '%unsigned%' THEN ' unsigned'
                            ELSE ''
                        END) AS type_name,
                    CHARACTER_MAXIMUM_LENGTH AS length,
                    IS_NULLABLE AS is_nullable,
                    COLUMN_DEFAULT AS column_def
                FROM information_schema.COLUMNS
                WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = {table}
                ORDER BY ORDINAL_POSITION
                "#,
            indexes: r#"
                SELECT
                    INDEX_NAME AS index_name,
                    COLUMN_NAME AS column_name,
                    NON_UNIQUE AS non_unique,
                    SEQ_IN_INDEX AS seq_in_index
                FROM information_schema.STATISTICS
                WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = {table}
                ORDER BY INDEX_NAME, SEQ_IN_INDEX
                "#,
            primary_keys: r#"
                SELECT CONSTRAINT_NAME AS pk_name
                FROM information_schema.TABLE_CONSTRAINTS
                WHERE TABLE_SCHEMA = DATABASE()
                  AND TABLE_NAME = {table}
                  AND CONSTRAINT_TYPE = 'PRIMARY KEY'
                "#,
            sequences: r#"
                SELECT TABLE_NAME AS table_name
                FROM information_schema.TABLES
                WHERE TABLE_SCHEMA = {schema} AND TABLE_TYPE = 'BASE TABLE'
                "#,
            views: r#"
                SELECT TABLE_NAME AS table_name
                FROM information_schema.VIEWS
                WHERE TABLE_SCHEMA = {schema}
                ORDER BY TABLE_NAME
                "#,
            triggers: r#"
                SELECT TRIGGER_NAME AS trigger_name
                FROM information_schema.TRIGGERS
                WHERE TRIGGER_SCHEMA = {schema}
                ORDER BY TRIGGER_NAME
                "#,
            table_triggers: r#"
                SELECT TRIGGER_NAME AS trigger_name
                FROM information_schema.TRIGGERS
                WHERE TRIGGER_SCHEMA = DATABASE() AND EVENT_OBJECT_TABLE = {table}
                ORDER BY TRIGGER_NAME
                "#,
            table_views: r#"
                SELECT DISTINCT VIEW_NAME AS view_name
                FROM information_schema.VIEW_TABLE_USAGE
                WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = {table}
                ORDER BY VIEW_NAME
                "#,
        };
    }

    pub mod sqlite {
        use super::super::CatalogQueries;

        pub const CATALOG: CatalogQueries = CatalogQueries {
            tables: r#"
                SELECT name FROM sqlite_master
                WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                ORDER BY name
                "#,
            columns: r#"
                SELECT
                    name AS column_name,
                    type ||
                        CASE WHEN pk = 1 AND lower(type) = 'integer' THEN ' identity' ELSE '' END
                        AS type_name,
                    NULL AS length,
                    CASE WHEN "notnull" = 1 OR pk = 1 THEN 'NO' ELSE 'YES' END AS is_nullable,
                    dflt_value AS column_def
                FROM pragma_table_info({table})
                ORDER BY cid
                "#,
            indexes: r#"
                SELECT
                    il.name AS index_name,
                    ii.name AS column_name,
                    CASE WHEN il."unique" = 1 THEN 0 ELSE 1 END AS non_unique,
                    ii.seqno + 1 AS seq_in_index
                FROM pragma_index_list({table}) il
                JOIN pragma_index_info(il.name) ii
                ORDER BY il.name, ii.seqno
                "#,
            primary_keys: "SELECT name AS pk_name FROM pragma_index_list({table}) WHERE origin = 'pk'",
            sequences: r#"
                SELECT name FROM sqlite_master
                WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                "#,
            views: "SELECT name FROM sqlite_master WHERE type = 'view' ORDER BY name",
            triggers: "SELECT name FROM sqlite_master WHERE type = 'trigger' ORDER BY name",
            table_triggers: r#"
                SELECT name FROM sqlite_master
                WHERE type = 'trigger' AND tbl_name = {table}
                ORDER BY name
                "#,
            table_views: r#"
                SELECT name FROM sqlite_master
                WHERE type = 'view' AND instr(lower(sql), lower({table})) > 0
                ORDER BY name
                "#,
        };
    }
}
