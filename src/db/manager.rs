//! Schema manager facade.
//!
//! [`SchemaManager`] is what applications call: it composes the inspector,
//! the DDL compiler and the database and sequence lifecycle operations over
//! one [`QueryExecutor`].

use crate::config::{DatabaseConfig, SchemaOptions};
use crate::db::ddl::{AlterPlan, DdlCompiler};
use crate::db::executor::{QueryExecutor, SqlxExecutor};
use crate::db::platform::Platform;
use crate::db::pool::DbPool;
use crate::db::schema::SchemaInspector;
use crate::error::{DbError, DbResult};
use crate::models::{ChangeSet, ColumnDescriptor, IndexDescriptor, SequenceDescriptor, TableDescriptor};
use crate::types::TypeRegistry;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Storage options of `CREATE DATABASE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Storage device (SQL Server `ON <device>`)
    pub device: Option<String>,
    /// Appended to the device as `=<size>`
    pub size: Option<String>,
}

impl From<&SchemaOptions> for DatabaseOptions {
    fn from(options: &SchemaOptions) -> Self {
        Self {
            device: options.database_device.clone(),
            size: options.database_size.clone(),
        }
    }
}

/// Per-call options of sequence creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Overrides the configured sequence column name
    pub seqcol_name: Option<String>,
}

/// Result of [`SchemaManager::alter_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterOutcome {
    /// Check-only call, the change set is supported
    Checked,
    /// Nothing to apply, no DDL was issued
    NoOp,
    Applied { statements: Vec<String> },
}

/// Result of the two-step sequence creation protocol.
#[derive(Debug)]
pub enum SequenceOutcome {
    /// Created at start 1, no seeding needed
    Created { sequence: String },
    /// Created and moved to the requested start value
    Seeded { sequence: String, start: i64 },
    /// Seeding failed, the created structure was dropped
    RolledBack { sequence: String, seed_error: DbError },
    /// Seeding failed and so did the compensating drop
    CompensationFailed {
        sequence: String,
        seed_error: DbError,
        drop_error: DbError,
    },
}

impl SequenceOutcome {
    /// Physical name of the sequence structure.
    pub fn sequence(&self) -> &str {
        match self {
            Self::Created { sequence }
            | Self::Seeded { sequence, .. }
            | Self::RolledBack { sequence, .. }
            | Self::CompensationFailed { sequence, .. } => sequence,
        }
    }

    /// Whether the sequence exists with the requested start value.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Seeded { .. })
    }
}

/// Vendor-neutral schema manager over one connection.
///
/// Cheap to share: the platform and registry sit behind `Arc`s and no
/// operation keeps state between calls.
pub struct SchemaManager<E: QueryExecutor> {
    executor: E,
    platform: Arc<Platform>,
    registry: Arc<TypeRegistry>,
    options: SchemaOptions,
}

impl SchemaManager<SqlxExecutor> {
    /// Connect with a bundled sqlx driver.
    ///
    /// Uses the dialect's built-in platform profile, the default type
    /// registry and the schema options of the URL.
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let pool = DbPool::connect(config).await?;
        Ok(Self::new(
            SqlxExecutor::new(pool),
            Arc::new(Platform::for_dialect(config.dialect)),
            Arc::new(TypeRegistry::with_defaults()),
            config.schema_options.clone(),
        ))
    }
}

impl<E: QueryExecutor> SchemaManager<E> {
    pub fn new(
        executor: E,
        platform: Arc<Platform>,
        registry: Arc<TypeRegistry>,
        options: SchemaOptions,
    ) -> Self {
        Self {
            executor,
            platform,
            registry,
            options,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    pub fn inspector(&self) -> SchemaInspector<'_, E> {
        SchemaInspector::new(&self.executor, &self.platform, &self.registry, &self.options)
    }

    pub fn compiler(&self) -> DdlCompiler<'_> {
        DdlCompiler::new(&self.platform)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub async fn list_tables(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        self.inspector().list_tables(database).await
    }

    pub async fn list_table_columns(
        &self,
        table: &str,
    ) -> DbResult<IndexMap<String, ColumnDescriptor>> {
        self.inspector().list_table_columns(table).await
    }

    pub async fn list_table_indexes(&self, table: &str) -> DbResult<Vec<IndexDescriptor>> {
        self.inspector().list_table_indexes(table).await
    }

    pub async fn list_sequences(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        self.inspector().list_sequences(database).await
    }

    pub async fn list_views(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        self.inspector().list_views(database).await
    }

    pub async fn list_triggers(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        self.inspector().list_triggers(database).await
    }

    pub async fn list_table_triggers(&self, table: &str) -> DbResult<Vec<String>> {
        self.inspector().list_table_triggers(table).await
    }

    pub async fn list_table_views(&self, table: &str) -> DbResult<Vec<String>> {
        self.inspector().list_table_views(table).await
    }

    pub async fn describe_table(&self, table: &str) -> DbResult<TableDescriptor> {
        self.inspector().describe_table(table).await
    }

    // =========================================================================
    // Database lifecycle
    // =========================================================================

    pub async fn create_database(&self, name: &str, options: &DatabaseOptions) -> DbResult<()> {
        require_name("Database", name)?;
        let sql = self.platform.create_database_sql(
            name,
            options.device.as_deref(),
            options.size.as_deref(),
        )?;
        self.executor.exec(&sql).await?;
        info!(database = %name, device = ?options.device, "Database created");
        Ok(())
    }

    pub async fn drop_database(&self, name: &str) -> DbResult<()> {
        require_name("Database", name)?;
        let sql = self.platform.drop_database_sql(name)?;
        self.executor.exec(&sql).await?;
        info!(database = %name, "Database dropped");
        Ok(())
    }

    // =========================================================================
    // Table alteration
    // =========================================================================

    /// Compile and apply a change set.
    ///
    /// Statements run in order without a surrounding transaction; the first
    /// failing statement aborts the call with its error.
    pub async fn alter_table(
        &self,
        table: &str,
        changes: &ChangeSet,
        check_only: bool,
    ) -> DbResult<AlterOutcome> {
        let statements = match self.compiler().compile(table, changes, check_only)? {
            AlterPlan::Checked => return Ok(AlterOutcome::Checked),
            AlterPlan::NoOp => {
                info!(table = %table, "Change set is empty, no DDL issued");
                return Ok(AlterOutcome::NoOp);
            }
            AlterPlan::Statements(statements) => statements,
        };

        for sql in &statements {
            self.executor.exec(sql).await?;
        }
        info!(table = %table, statements = statements.len(), "Table altered");
        Ok(AlterOutcome::Applied { statements })
    }

    // =========================================================================
    // Sequences
    // =========================================================================

    /// Physical name of a logical sequence (`seqname_format` applied).
    pub fn sequence_name(&self, name: &str) -> String {
        self.options.seqname_format.replacen("%s", name, 1)
    }

    /// Create a sequence and report the protocol outcome.
    ///
    /// Step one creates the structure counting from 1. When `start` differs,
    /// step two seeds it; a failed seed drops the structure again before
    /// returning. Only a failure of step one is returned as `Err`.
    ///
    /// A seeded sequence has `start` as its current value on every dialect;
    /// the next generated value is `start + 1`.
    pub async fn create_sequence_outcome(
        &self,
        name: &str,
        start: i64,
        options: &SequenceOptions,
    ) -> DbResult<SequenceOutcome> {
        require_name("Sequence", name)?;
        let sequence = self.sequence_name(name);
        let column = options
            .seqcol_name
            .as_deref()
            .unwrap_or(self.options.seqcol_name.as_str());

        let create = self.platform.create_sequence_sql(&sequence, column);
        self.executor.exec(&create).await?;

        if start == 1 {
            info!(sequence = %sequence, "Sequence created");
            return Ok(SequenceOutcome::Created { sequence });
        }

        let seed = self.platform.seed_sequence_sql(&sequence, column, start);
        let seed_error = match self.executor.exec(&seed).await {
            Ok(_) => {
                info!(sequence = %sequence, start, "Sequence created and seeded");
                return Ok(SequenceOutcome::Seeded { sequence, start });
            }
            Err(e) => e,
        };

        warn!(sequence = %sequence, start, error = %seed_error, "Seeding failed, dropping sequence");
        match self.executor.exec(&self.platform.drop_sequence_sql(&sequence)).await {
            Ok(_) => Ok(SequenceOutcome::RolledBack {
                sequence,
                seed_error,
            }),
            Err(drop_error) => {
                error!(
                    sequence = %sequence,
                    seed_error = %seed_error,
                    drop_error = %drop_error,
                    "Could not drop inconsistent sequence"
                );
                Ok(SequenceOutcome::CompensationFailed {
                    sequence,
                    seed_error,
                    drop_error,
                })
            }
        }
    }

    /// Create a sequence starting at `start`.
    ///
    /// Either the sequence exists with the requested start value afterwards,
    /// or an error is returned: `SequenceSeed` when the created structure was
    /// rolled back, `CompensationFailure` when the rollback failed too.
    pub async fn create_sequence(
        &self,
        name: &str,
        start: i64,
        options: &SequenceOptions,
    ) -> DbResult<SequenceDescriptor> {
        match self.create_sequence_outcome(name, start, options).await? {
            SequenceOutcome::Created { .. } | SequenceOutcome::Seeded { .. } => {
                Ok(SequenceDescriptor::new(name, start))
            }
            SequenceOutcome::RolledBack {
                sequence,
                seed_error,
            } => Err(DbError::SequenceSeed {
                sequence,
                source: Box::new(seed_error),
            }),
            SequenceOutcome::CompensationFailed {
                sequence,
                seed_error,
                drop_error,
            } => Err(DbError::CompensationFailure {
                sequence,
                seed: Box::new(seed_error),
                drop: Box::new(drop_error),
            }),
        }
    }

    /// SQL dropping the structure of a logical sequence.
    pub fn drop_sequence_sql(&self, name: &str) -> String {
        self.platform.drop_sequence_sql(&self.sequence_name(name))
    }

    pub async fn drop_sequence(&self, name: &str) -> DbResult<()> {
        require_name("Sequence", name)?;
        self.executor.exec(&self.drop_sequence_sql(name)).await?;
        info!(sequence = %self.sequence_name(name), "Sequence dropped");
        Ok(())
    }

    /// Keyword placed between `CREATE` and `TABLE` for temporary tables.
    pub fn temporary_table_keyword(&self) -> &'static str {
        self.platform.temporary_table_keyword()
    }
}

fn require_name(what: &str, name: &str) -> DbResult<()> {
    if name.trim().is_empty() {
        return Err(DbError::invalid_input(format!("{} name cannot be empty", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_options_from_schema_options() {
        let options = SchemaOptions {
            database_device: Some("data_dev".to_string()),
            database_size: Some("10MB".to_string()),
            ..SchemaOptions::default()
        };
        let db = DatabaseOptions::from(&options);
        assert_eq!(db.device.as_deref(), Some("data_dev"));
        assert_eq!(db.size.as_deref(), Some("10MB"));
    }

    #[test]
    fn test_sequence_outcome_accessors() {
        let outcome = SequenceOutcome::Seeded {
            sequence: "orders_seq".to_string(),
            start: 5,
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.sequence(), "orders_seq");

        let outcome = SequenceOutcome::RolledBack {
            sequence: "orders_seq".to_string(),
            seed_error: DbError::invalid_input("boom"),
        };
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_require_name() {
        assert!(require_name("Sequence", "orders").is_ok());
        assert!(require_name("Sequence", "  ").is_err());
    }
}
