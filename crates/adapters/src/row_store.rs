// SPDX-License-Identifier: MIT

//! In-memory `RowStore` (spec §6 "Row store"): the relational-store
//! collaborator spec §1 names as an external concern out of scope for this
//! core ("relational store: SQL execution and row scanning for
//! history/config"). This adapter gives the notification service's durable
//! history path (spec §4.8 "Durable history") something concrete to write
//! through without this workspace shipping an actual SQL engine — a real
//! desktop-shell host swaps this for a `sqlite`/`sqlx` backed store that
//! speaks the same `notification_history`/`notification_config` schema
//! (spec §6).
//!
//! Supports the exact statements `mcpweaver-notify` issues: parameterised
//! `INSERT`/`UPDATE` by positional `?` placeholders and a handful of
//! `SELECT ... ORDER BY created_at DESC LIMIT ?` shapes, matched by a small
//! keyword sniff rather than a real SQL parser.

use std::collections::HashMap;

use async_trait::async_trait;
use mcpweaver_core::{AppError, Row, RowStore, SqlValue};
use parking_lot::RwLock;

#[derive(Clone, Default)]
struct TableRow {
    columns: HashMap<String, SqlValue>,
}

/// A process-local table store keyed by primary key string, good enough to
/// back the notification history cache hydration round-trip (spec §8
/// "Round-trip / idempotence") without a real database.
#[derive(Default)]
pub struct InMemoryRowStore {
    notification_history: RwLock<HashMap<String, TableRow>>,
    history_insert_order: RwLock<Vec<String>>,
}

impl InMemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notification_history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const HISTORY_COLUMNS: &[&str] = &[
    "id",
    "type",
    "title",
    "message",
    "icon",
    "actions",
    "category",
    "priority",
    "created_at",
    "source",
    "metadata",
];

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn exec(&self, sql: &str, args: Vec<SqlValue>) -> Result<u64, AppError> {
        let normalized = sql.trim_start().to_ascii_uppercase();

        if normalized.starts_with("INSERT INTO NOTIFICATION_HISTORY") {
            if args.len() != HISTORY_COLUMNS.len() {
                return Err(AppError::new(mcpweaver_core::ErrorKind::Database, 
                    "row_store.arity_mismatch",
                    format!("expected {} insert columns, got {}", HISTORY_COLUMNS.len(), args.len()),
                ));
            }
            let id = match &args[0] {
                SqlValue::Text(s) => s.clone(),
                _ => return Err(AppError::new(mcpweaver_core::ErrorKind::Database, "row_store.bad_id", "notification_history.id must be text")),
            };
            let mut columns = HashMap::new();
            for (name, value) in HISTORY_COLUMNS.iter().zip(args.into_iter()) {
                columns.insert((*name).to_string(), value);
            }
            self.notification_history.write().insert(id.clone(), TableRow { columns });
            self.history_insert_order.write().push(id);
            return Ok(1);
        }

        if normalized.starts_with("UPDATE NOTIFICATION_HISTORY") {
            // Every update statement's last bound arg is the `WHERE id = ?`
            // value; the rest are the SET columns in source order.
            let Some((id_value, set_values)) = args.split_last() else {
                return Err(AppError::new(mcpweaver_core::ErrorKind::Database, "row_store.missing_id", "update statement had no arguments"));
            };
            let SqlValue::Text(id) = id_value else {
                return Err(AppError::new(mcpweaver_core::ErrorKind::Database, "row_store.bad_id", "update WHERE id must be text"));
            };
            let set_columns = update_set_columns(&normalized);
            if set_columns.len() != set_values.len() {
                return Err(AppError::new(mcpweaver_core::ErrorKind::Database, 
                    "row_store.arity_mismatch",
                    format!("expected {} set columns, got {}", set_columns.len(), set_values.len()),
                ));
            }
            let mut table = self.notification_history.write();
            let Some(row) = table.get_mut(id) else {
                return Ok(0);
            };
            for (column, value) in set_columns.into_iter().zip(set_values.iter().cloned()) {
                row.columns.insert(column, value);
            }
            return Ok(1);
        }

        Err(AppError::new(mcpweaver_core::ErrorKind::Database, "row_store.unsupported_statement", format!("unsupported statement: {sql}")))
    }

    async fn query(&self, sql: &str, args: Vec<SqlValue>) -> Result<Vec<Row>, AppError> {
        let normalized = sql.trim_start().to_ascii_uppercase();
        if !normalized.starts_with("SELECT") || !normalized.contains("NOTIFICATION_HISTORY") {
            return Err(AppError::new(mcpweaver_core::ErrorKind::Database, "row_store.unsupported_statement", format!("unsupported query: {sql}")));
        }

        let limit = match args.first() {
            Some(SqlValue::Integer(n)) => (*n).max(0) as usize,
            _ => usize::MAX,
        };

        let order = self.history_insert_order.read().clone();
        let table = self.notification_history.read();
        let mut rows: Vec<(chrono::DateTime<chrono::Utc>, Row)> = order
            .iter()
            .rev()
            .filter_map(|id| table.get(id).map(|row| (id, row)))
            .map(|(_, row)| {
                let floor = chrono::DateTime::<chrono::Utc>::MIN_UTC;
                let created_at = match row.columns.get("created_at") {
                    Some(SqlValue::Text(s)) => {
                        chrono::DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&chrono::Utc)).unwrap_or(floor)
                    }
                    _ => floor,
                };
                (created_at, Row(row.columns.clone()))
            })
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.truncate(limit);
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}

/// Best-effort extraction of the `SET col1 = ?, col2 = ?` column list from
/// an uppercased `UPDATE notification_history SET ... WHERE id = ?`
/// statement, in source order.
fn update_set_columns(normalized_sql: &str) -> Vec<String> {
    let Some(set_start) = normalized_sql.find("SET ") else { return Vec::new() };
    let after_set = &normalized_sql[set_start + 4..];
    let clause_end = after_set.find(" WHERE").unwrap_or(after_set.len());
    after_set[..clause_end]
        .split(',')
        .filter_map(|assignment| assignment.split('=').next())
        .map(|col| col.trim().to_ascii_lowercase())
        .collect()
}
