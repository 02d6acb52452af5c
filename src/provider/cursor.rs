//! Row materialization and the lazy record cursor.
//!
//! Two read shapes come out of the provider layer:
//!
//! - [`RowSet`]: a fully materialized result (shared column header plus one
//!   [`StoredRow`] per row), returned by the raw `query` operation.
//! - [`RecordQuery`] / [`RecordCursor`]: a lazy, single-pass, forward-only
//!   sequence over an open statement, for callers that stream typed records.
//!   The cursor must be closed by its consumer; closing twice or pulling
//!   after close is a reported error, not a silent no-op. Dropping the
//!   cursor releases the underlying statement either way.

use crate::error::{StoreError, StoreResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row, Rows, Statement};
use std::sync::Arc;

/// One materialized row: a shared column header plus owned values.
#[derive(Debug, Clone)]
pub struct StoredRow {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl StoredRow {
    fn from_row(columns: &Arc<Vec<String>>, row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut values = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            values.push(row.get::<_, Value>(index)?);
        }
        Ok(Self {
            columns: Arc::clone(columns),
            values,
        })
    }

    /// Raw value for a column name.
    pub fn value(&self, column: &str) -> StoreResult<&Value> {
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| StoreError::Column(column.to_string()))?;
        Ok(&self.values[index])
    }

    pub fn i64(&self, column: &str) -> StoreResult<i64> {
        match self.value(column)? {
            Value::Integer(value) => Ok(*value),
            _ => Err(StoreError::Column(column.to_string())),
        }
    }

    /// Real column read as `f64`. Integer columns coerce through a plain
    /// cast; magnitudes beyond 2^53 lose precision.
    pub fn f64(&self, column: &str) -> StoreResult<f64> {
        match self.value(column)? {
            Value::Real(value) => Ok(*value),
            Value::Integer(value) => Ok(*value as f64),
            _ => Err(StoreError::Column(column.to_string())),
        }
    }

    pub fn text(&self, column: &str) -> StoreResult<String> {
        match self.value(column)? {
            Value::Text(value) => Ok(value.clone()),
            _ => Err(StoreError::Column(column.to_string())),
        }
    }

    pub fn opt_text(&self, column: &str) -> StoreResult<Option<String>> {
        match self.value(column)? {
            Value::Text(value) => Ok(Some(value.clone())),
            Value::Null => Ok(None),
            _ => Err(StoreError::Column(column.to_string())),
        }
    }

    /// Integer column read as a boolean (`0` false, anything else true).
    pub fn bool(&self, column: &str) -> StoreResult<bool> {
        Ok(self.i64(column)? != 0)
    }

    pub fn is_null(&self, column: &str) -> StoreResult<bool> {
        Ok(matches!(self.value(column)?, Value::Null))
    }

    /// Column names of this row, in select order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Fully materialized query result.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    rows: Vec<StoredRow>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&StoredRow> {
        self.rows.first()
    }

    pub fn get(&self, index: usize) -> Option<&StoredRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredRow> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a StoredRow;
    type IntoIter = std::slice::Iter<'a, StoredRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

pub(crate) fn column_header(stmt: &Statement<'_>) -> Arc<Vec<String>> {
    Arc::new(stmt.column_names().iter().map(|c| c.to_string()).collect())
}

/// Runs a prepared statement to completion into a [`RowSet`].
pub(crate) fn fetch_rows(stmt: &mut Statement<'_>, args: &[Value]) -> StoreResult<RowSet> {
    let columns = column_header(stmt);
    let mut rows = stmt.query(params_from_iter(args.iter()))?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next()? {
        collected.push(StoredRow::from_row(&columns, row)?);
    }
    Ok(RowSet { rows: collected })
}

/// A prepared, argument-bound typed read, ready to run once.
///
/// Produced by `ResourceRouter::record_query`; borrow-tied to the router's
/// connection. Call [`RecordQuery::run`] with a row-to-record factory to
/// obtain the cursor.
pub struct RecordQuery<'conn> {
    stmt: Statement<'conn>,
    args: Vec<Value>,
    columns: Arc<Vec<String>>,
}

impl<'conn> RecordQuery<'conn> {
    pub(crate) fn new(stmt: Statement<'conn>, args: Vec<Value>) -> Self {
        let columns = column_header(&stmt);
        Self { stmt, args, columns }
    }

    /// Opens the cursor. The query executes lazily as rows are pulled.
    pub fn run<R, F>(&mut self, factory: F) -> StoreResult<RecordCursor<'_, R, F>>
    where
        F: FnMut(&StoredRow) -> StoreResult<R>,
    {
        let rows = self.stmt.query(params_from_iter(self.args.iter()))?;
        Ok(RecordCursor {
            rows: Some(rows),
            columns: Arc::clone(&self.columns),
            factory,
        })
    }
}

/// Lazy, single-pass, forward-only sequence of typed records.
pub struct RecordCursor<'stmt, R, F: FnMut(&StoredRow) -> StoreResult<R>> {
    rows: Option<Rows<'stmt>>,
    columns: Arc<Vec<String>>,
    factory: F,
}

impl<R, F: FnMut(&StoredRow) -> StoreResult<R>> RecordCursor<'_, R, F> {
    /// Pulls the next record, or `None` once the sequence is drained.
    pub fn next_record(&mut self) -> StoreResult<Option<R>> {
        let rows = self.rows.as_mut().ok_or(StoreError::CursorClosed)?;
        match rows.next()? {
            Some(row) => {
                let stored = StoredRow::from_row(&self.columns, row)?;
                (self.factory)(&stored).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Closes the cursor, releasing the underlying statement immediately.
    /// Further pulls, and a second close, are errors.
    pub fn close(&mut self) -> StoreResult<()> {
        self.rows.take().map(drop).ok_or(StoreError::CursorClosed)
    }

    pub fn is_open(&self) -> bool {
        self.rows.is_some()
    }
}
