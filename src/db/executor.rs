//! Query execution collaborator.
//!
//! The schema components never talk to a driver directly; they issue SQL
//! through [`QueryExecutor`]. [`SqlxExecutor`] implements it over the bundled
//! sqlx pools, and tests or other drivers (SQL Server) plug in their own.
//!
//! # Architecture
//!
//! The sqlx executor uses database-specific implementations organized in
//! submodules (`mysql`, `postgres`, `sqlite`), each providing the same
//! interface adapted to its pool type.

use crate::db::pool::DbPool;
use crate::db::types::{JsonRow, RowToJson};
use crate::error::{DbError, DbResult};
use serde_json::Value as JsonValue;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Default per-statement timeout of [`SqlxExecutor`].
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 30;

/// Executes SQL on behalf of the schema components.
///
/// Errors must carry the SQL that produced them (see [`DbError::from_sqlx`]).
/// Implementations own any retry or timeout policy; callers never retry.
pub trait QueryExecutor: Send + Sync {
    /// Execute a statement and return the affected row count.
    fn exec(&self, sql: &str) -> impl Future<Output = DbResult<u64>> + Send;

    /// Fetch all rows as column-name keyed maps, columns in select order.
    fn fetch_assoc(&self, sql: &str) -> impl Future<Output = DbResult<Vec<JsonRow>>> + Send;

    /// Fetch one column of every row.
    ///
    /// With `key`, the column is looked up by case-insensitive name (missing
    /// columns yield `null`); without it, the first column is used.
    fn fetch_column(
        &self,
        sql: &str,
        key: Option<&str>,
    ) -> impl Future<Output = DbResult<Vec<JsonValue>>> + Send {
        async move {
            let rows = self.fetch_assoc(sql).await?;
            Ok(rows.iter().map(|row| column_value(row, key)).collect())
        }
    }
}

/// Pick one value out of a row, see [`QueryExecutor::fetch_column`].
pub fn column_value(row: &JsonRow, key: Option<&str>) -> JsonValue {
    let value = match key {
        Some(key) => row
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value),
        None => row.values().next(),
    };
    value.cloned().unwrap_or(JsonValue::Null)
}

/// [`QueryExecutor`] over a bundled sqlx pool.
#[derive(Debug, Clone)]
pub struct SqlxExecutor {
    pool: DbPool,
    statement_timeout: Duration,
}

impl SqlxExecutor {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            statement_timeout: Duration::from_secs(DEFAULT_STATEMENT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, statement_timeout: Duration) -> Self {
        self.statement_timeout = statement_timeout;
        self
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl QueryExecutor for SqlxExecutor {
    async fn exec(&self, sql: &str) -> DbResult<u64> {
        debug!(sql = %sql, "Executing statement");
        match &self.pool {
            DbPool::MySql(p) => mysql::execute(p, sql, self.statement_timeout).await,
            DbPool::Postgres(p) => postgres::execute(p, sql, self.statement_timeout).await,
            DbPool::SQLite(p) => sqlite::execute(p, sql, self.statement_timeout).await,
        }
    }

    async fn fetch_assoc(&self, sql: &str) -> DbResult<Vec<JsonRow>> {
        debug!(sql = %sql, "Fetching rows");
        let rows = match &self.pool {
            DbPool::MySql(p) => to_json_rows(mysql::fetch_rows(p, sql, self.statement_timeout).await?),
            DbPool::Postgres(p) => {
                to_json_rows(postgres::fetch_rows(p, sql, self.statement_timeout).await?)
            }
            DbPool::SQLite(p) => to_json_rows(sqlite::fetch_rows(p, sql, self.statement_timeout).await?),
        };
        debug!(rows = rows.len(), "Rows fetched");
        Ok(rows)
    }
}

fn to_json_rows<R: RowToJson>(rows: Vec<R>) -> Vec<JsonRow> {
    rows.iter().map(RowToJson::to_json_map).collect()
}

fn timeout_error(operation: &str, limit: Duration, sql: &str) -> DbError {
    DbError::timeout(operation, limit.as_secs(), sql)
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Statements are sent unprepared: catalog procedures and DDL (EXEC, CREATE
// SEQUENCE, ...) do not support prepared statements everywhere.

mod mysql {
    use super::*;
    use futures_util::TryStreamExt;
    use sqlx::Executor;
    use sqlx::MySqlPool;
    use sqlx::mysql::MySqlRow;

    pub async fn fetch_rows(pool: &MySqlPool, sql: &str, limit: Duration) -> DbResult<Vec<MySqlRow>> {
        match timeout(limit, pool.fetch(sql).try_collect::<Vec<_>>()).await {
            Ok(result) => result.map_err(|e| DbError::from_sqlx(e, sql)),
            Err(_) => Err(timeout_error("query execution", limit, sql)),
        }
    }

    pub async fn execute(pool: &MySqlPool, sql: &str, limit: Duration) -> DbResult<u64> {
        match timeout(limit, pool.execute(sql)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(DbError::from_sqlx(e, sql)),
            Err(_) => Err(timeout_error("statement execution", limit, sql)),
        }
    }
}

mod postgres {
    use super::*;
    use futures_util::TryStreamExt;
    use sqlx::Executor;
    use sqlx::PgPool;
    use sqlx::postgres::PgRow;

    pub async fn fetch_rows(pool: &PgPool, sql: &str, limit: Duration) -> DbResult<Vec<PgRow>> {
        match timeout(limit, pool.fetch(sql).try_collect::<Vec<_>>()).await {
            Ok(result) => result.map_err(|e| DbError::from_sqlx(e, sql)),
            Err(_) => Err(timeout_error("query execution", limit, sql)),
        }
    }

    pub async fn execute(pool: &PgPool, sql: &str, limit: Duration) -> DbResult<u64> {
        match timeout(limit, pool.execute(sql)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(DbError::from_sqlx(e, sql)),
            Err(_) => Err(timeout_error("statement execution", limit, sql)),
        }
    }
}

mod sqlite {
    use super::*;
    use futures_util::TryStreamExt;
    use sqlx::Executor;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqliteRow;

    pub async fn fetch_rows(
        pool: &SqlitePool,
        sql: &str,
        limit: Duration,
    ) -> DbResult<Vec<SqliteRow>> {
        match timeout(limit, pool.fetch(sql).try_collect::<Vec<_>>()).await {
            Ok(result) => result.map_err(|e| DbError::from_sqlx(e, sql)),
            Err(_) => Err(timeout_error("query execution", limit, sql)),
        }
    }

    pub async fn execute(pool: &SqlitePool, sql: &str, limit: Duration) -> DbResult<u64> {
        match timeout(limit, pool.execute(sql)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(DbError::from_sqlx(e, sql)),
            Err(_) => Err(timeout_error("statement execution", limit, sql)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: JsonValue) -> JsonRow {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_column_value_first_column() {
        let r = row(json!({"name": "users", "type": "U"}));
        assert_eq!(column_value(&r, None), json!("users"));
    }

    #[test]
    fn test_column_value_case_insensitive_key() {
        let r = row(json!({"INDEX_NAME": "idx_email", "NON_UNIQUE": 0}));
        assert_eq!(column_value(&r, Some("index_name")), json!("idx_email"));
        assert_eq!(column_value(&r, Some("pk_name")), JsonValue::Null);
    }

    #[test]
    fn test_column_value_empty_row() {
        assert_eq!(column_value(&JsonRow::new(), None), JsonValue::Null);
    }

    #[tokio::test]
    async fn test_sqlx_executor_round_trip() {
        let config = crate::config::DatabaseConfig::parse("sqlite::memory:").unwrap();
        let executor = SqlxExecutor::new(DbPool::connect(&config).await.unwrap());

        executor
            .exec("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT)")
            .await
            .unwrap();
        let affected = executor
            .exec("INSERT INTO items (id, label) VALUES (1, 'a'), (2, 'b')")
            .await
            .unwrap();
        assert_eq!(affected, 2);

        let labels = executor
            .fetch_column("SELECT id, label FROM items ORDER BY id", Some("LABEL"))
            .await
            .unwrap();
        assert_eq!(labels, vec![json!("a"), json!("b")]);

        let err = executor.fetch_assoc("SELECT * FROM missing").await.unwrap_err();
        assert_eq!(err.sql(), Some("SELECT * FROM missing"));
    }
}
