//! Database abstraction layer.
//!
//! This module provides the schema-management functionality:
//! - Platform capability profiles and catalog query templates
//! - Connection pool management and query execution
//! - Schema introspection
//! - ALTER TABLE compilation
//! - The schema manager facade with database and sequence lifecycle

pub mod ddl;
pub mod executor;
pub mod manager;
pub mod platform;
pub mod pool;
pub mod schema;
pub mod types;

pub use ddl::{AlterClause, AlterPlan, AlterTableBuilder, DdlCompiler};
pub use executor::{QueryExecutor, SqlxExecutor};
pub use manager::{AlterOutcome, DatabaseOptions, SchemaManager, SequenceOptions, SequenceOutcome};
pub use platform::{AlterStyle, CatalogQueries, Platform};
pub use pool::DbPool;
pub use schema::SchemaInspector;
pub use types::JsonRow;
