//! Data models for the schema manager.
//!
//! This module re-exports all model types used throughout the crate.

pub mod change_set;
pub mod connection;
pub mod schema;

// Re-export commonly used types
pub use change_set::{ChangeKind, ChangeSet, ColumnSpec, RenameSpec};
pub use connection::Dialect;
pub use schema::{ColumnDescriptor, IndexDescriptor, SequenceDescriptor, TableDescriptor};
