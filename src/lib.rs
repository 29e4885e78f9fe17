//! Vendor-neutral database schema manager.
//!
//! This library introspects SQL catalogs into vendor-neutral descriptors,
//! compiles structured change sets into dialect-specific DDL, manages database
//! and sequence lifecycles, and converts temporal values between application
//! and storage representations (SQL Server, PostgreSQL, MySQL, SQLite).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod types;

pub use config::{DatabaseConfig, SchemaOptions};
pub use db::{Platform, QueryExecutor, SchemaManager};
pub use error::{DbError, DbResult};
pub use types::{TypeRegistry, Value};
