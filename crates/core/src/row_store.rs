// SPDX-License-Identifier: MIT

//! Abstract row store (spec §6): the relational-store collaborator.
//!
//! Out of scope per spec.md §1 is the SQL engine itself; what's in scope is
//! the narrow interface NS's durable history and (eventually) a template
//! store consume. Modeled as parameterised `exec`/`query` over a small
//! dynamically-typed [`SqlValue`], the way the teacher's storage crate
//! keeps its `MaterializedState` independent of any particular SQL driver.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::AppError;

/// A single bound parameter or column value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Integer(v as i64)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// A returned row, addressed by column name.
#[derive(Debug, Clone, Default)]
pub struct Row(pub HashMap<String, SqlValue>);

impl Row {
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.0.get(column)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.get(column) {
            Some(SqlValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column) {
            Some(SqlValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

/// Abstract connection exposing parameterised exec/query, matching spec
/// §6's "relational store (SQL execution and row scanning)" collaborator.
#[async_trait]
pub trait RowStore: Send + Sync + 'static {
    async fn exec(&self, sql: &str, args: Vec<SqlValue>) -> Result<u64, AppError>;
    async fn query(&self, sql: &str, args: Vec<SqlValue>) -> Result<Vec<Row>, AppError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// In-memory row store for tests: records every statement executed and
    /// returns a queued response for the next `query` call.
    #[derive(Clone, Default)]
    pub struct FakeRowStore {
        pub exec_log: Arc<Mutex<Vec<(String, Vec<SqlValue>)>>>,
        pub query_responses: Arc<Mutex<Vec<Vec<Row>>>>,
    }

    impl FakeRowStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_query_response(&self, rows: Vec<Row>) {
            self.query_responses.lock().push(rows);
        }

        pub fn exec_count(&self) -> usize {
            self.exec_log.lock().len()
        }
    }

    #[async_trait]
    impl RowStore for FakeRowStore {
        async fn exec(&self, sql: &str, args: Vec<SqlValue>) -> Result<u64, AppError> {
            self.exec_log.lock().push((sql.to_string(), args));
            Ok(1)
        }

        async fn query(&self, _sql: &str, _args: Vec<SqlValue>) -> Result<Vec<Row>, AppError> {
            Ok(self.query_responses.lock().pop().unwrap_or_default())
        }
    }
}
