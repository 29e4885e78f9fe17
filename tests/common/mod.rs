//! Shared test helpers.
//!
//! `ScriptedExecutor` answers SQL from a script of canned responses and
//! records every statement it receives, so tests can assert on the exact SQL
//! and its order without a database.

#![allow(dead_code)]

use db_schema_manager::db::{JsonRow, QueryExecutor};
use db_schema_manager::error::{DbError, DbResult};
use serde_json::Value as JsonValue;
use std::sync::Mutex;

/// Canned response for statements containing a pattern.
#[derive(Debug, Clone)]
pub enum Response {
    Rows(Vec<JsonRow>),
    Affected(u64),
    Fail(String),
}

#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    rules: Vec<(String, Response)>,
    log: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer statements containing `pattern` with `rows`.
    pub fn rows(mut self, pattern: &str, rows: Vec<JsonValue>) -> Self {
        let rows = rows.into_iter().map(object).collect();
        self.rules.push((pattern.to_string(), Response::Rows(rows)));
        self
    }

    /// Fail statements containing `pattern`.
    pub fn fail(mut self, pattern: &str, message: &str) -> Self {
        self.rules
            .push((pattern.to_string(), Response::Fail(message.to_string())));
        self
    }

    /// Statements received so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn respond(&self, sql: &str) -> Option<Response> {
        self.log.lock().unwrap().push(sql.to_string());
        self.rules
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
    }
}

impl QueryExecutor for ScriptedExecutor {
    async fn exec(&self, sql: &str) -> DbResult<u64> {
        match self.respond(sql) {
            Some(Response::Fail(message)) => Err(DbError::database(message, sql, None)),
            Some(Response::Affected(n)) => Ok(n),
            Some(Response::Rows(rows)) => Ok(rows.len() as u64),
            None => Ok(0),
        }
    }

    async fn fetch_assoc(&self, sql: &str) -> DbResult<Vec<JsonRow>> {
        match self.respond(sql) {
            Some(Response::Fail(message)) => Err(DbError::database(message, sql, None)),
            Some(Response::Rows(rows)) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }
}

pub fn object(value: JsonValue) -> JsonRow {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
