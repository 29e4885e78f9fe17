//! Error types for the schema manager.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Validation errors (invalid type, invalid format, unsupported operation) are raised
//! locally and never retried; DBMS errors carry the SQL that produced them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Could not convert value of type {actual} to '{type_name}'. Expected one of: {}", accepted.join(", "))]
    InvalidType {
        type_name: String,
        actual: String,
        accepted: Vec<String>,
    },

    #[error("Could not convert '{value}' to '{type_name}'. Expected format: {expected}")]
    InvalidFormat {
        type_name: String,
        value: String,
        expected: String,
    },

    #[error("Operation '{operation}' is not supported by platform {platform}")]
    UnsupportedOperation { operation: String, platform: String },

    #[error("Catalog query for {object} failed: {source}")]
    CatalogQuery {
        object: String,
        sql: String,
        #[source]
        source: Box<DbError>,
    },

    #[error("Database error: {message} (sql: {sql})")]
    Database {
        message: String,
        sql: String,
        /// e.g., "42S02" for invalid object name
        sql_state: Option<String>,
    },

    #[error("Seeding sequence '{sequence}' failed, created table was dropped: {source}")]
    SequenceSeed {
        sequence: String,
        #[source]
        source: Box<DbError>,
    },

    #[error("Seeding sequence '{sequence}' failed: {seed}; dropping the created table also failed: {drop}")]
    CompensationFailure {
        sequence: String,
        #[source]
        seed: Box<DbError>,
        drop: Box<DbError>,
    },

    #[error("Unknown column type '{type_name}' requested from the type registry")]
    UnknownType { type_name: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Timeout after {timeout_secs}s during {operation} (sql: {sql})")]
    Timeout {
        operation: String,
        timeout_secs: u64,
        sql: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

/// Category of a [`DbError`], for callers that only care about the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    InvalidType,
    InvalidFormat,
    UnsupportedOperation,
    CatalogQueryFailure,
    Database,
    SequenceSeed,
    CompensationFailure,
    UnknownType,
    Connection,
    Timeout,
    InvalidInput,
}

impl DbError {
    /// Create an invalid type error listing the accepted value kinds.
    pub fn invalid_type(
        type_name: impl Into<String>,
        actual: impl Into<String>,
        accepted: &[&str],
    ) -> Self {
        Self::InvalidType {
            type_name: type_name.into(),
            actual: actual.into(),
            accepted: accepted.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create an invalid format error naming the attempted format.
    pub fn invalid_format(
        type_name: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidFormat {
            type_name: type_name.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create an unsupported operation error.
    pub fn unsupported(operation: impl Into<String>, platform: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            platform: platform.into(),
        }
    }

    /// Wrap a collaborator failure raised while listing a catalog object.
    pub fn catalog_query(object: impl Into<String>, sql: impl Into<String>, source: DbError) -> Self {
        Self::CatalogQuery {
            object: object.into(),
            sql: sql.into(),
            source: Box::new(source),
        }
    }

    /// Create a database error tagged with the originating SQL.
    pub fn database(
        message: impl Into<String>,
        sql: impl Into<String>,
        sql_state: Option<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql: sql.into(),
            sql_state,
        }
    }

    /// Create an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error for a statement that did not complete in time.
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64, sql: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
            sql: sql.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Convert a sqlx error, keeping the SQL that produced it.
    pub fn from_sqlx(err: sqlx::Error, sql: &str) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(db_err.message(), sql, code)
            }
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::PoolTimedOut => DbError::connection(
                "Timed out acquiring a connection from the pool",
                "Raise acquire_timeout or max_connections",
            ),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            other => DbError::database(other.to_string(), sql, None),
        }
    }

    /// Get the category of this error.
    pub fn kind(&self) -> DbErrorKind {
        match self {
            Self::InvalidType { .. } => DbErrorKind::InvalidType,
            Self::InvalidFormat { .. } => DbErrorKind::InvalidFormat,
            Self::UnsupportedOperation { .. } => DbErrorKind::UnsupportedOperation,
            Self::CatalogQuery { .. } => DbErrorKind::CatalogQueryFailure,
            Self::Database { .. } => DbErrorKind::Database,
            Self::SequenceSeed { .. } => DbErrorKind::SequenceSeed,
            Self::CompensationFailure { .. } => DbErrorKind::CompensationFailure,
            Self::UnknownType { .. } => DbErrorKind::UnknownType,
            Self::Connection { .. } => DbErrorKind::Connection,
            Self::Timeout { .. } => DbErrorKind::Timeout,
            Self::InvalidInput { .. } => DbErrorKind::InvalidInput,
        }
    }

    /// Get the SQL statement this error originated from, if any.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Database { sql, .. }
            | Self::CatalogQuery { sql, .. }
            | Self::Timeout { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// Whether the failure is transient and the caller may retry.
    ///
    /// Validation errors never are; nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }
}

/// Result type alias for schema and conversion operations.
pub type DbResult<T> = Result<T, DbError>;
