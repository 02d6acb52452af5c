//! Per-table CRUD dispatch: the [`ActionTable`] contract and its default
//! SQLite implementation.
//!
//! Each logical table is bound at router construction to one [`ActionTable`]
//! instance plus a mode flag: a *row-addressed* binding expects every address
//! to end with a literal identity segment and targets at most one row, a
//! *collection* binding addresses the whole table. [`DefaultActionTable`]
//! covers the normal case; callers bind a custom implementation when a table
//! needs special handling.
//!
//! Identity-addressed operations compose their filter as
//! `id = ? AND (extra)` so callers can still narrow within the addressed
//! row (useful for existence checks). Predicate assembly borrows a pooled
//! [`QueryExpression`]; pool exhaustion surfaces as a recoverable error.

use crate::error::{StoreError, StoreResult};
use crate::pool::Pooled;
use crate::provider::address::Address;
use crate::provider::cursor::{fetch_rows, RowSet};
use crate::provider::router::ResourceRouter;
use crate::query::expression::{Operator, QueryExpression};
use crate::query::values::ValueSet;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Name of the identity column every routed table carries.
pub const IDENTITY_COLUMN: &str = "id";

/// Immutable binding of one logical table.
#[derive(Debug, Clone)]
pub struct TableBinding {
    /// Backing table name forwarded to the store.
    pub table: String,
    /// True when addresses carry a trailing row identity.
    pub by_identity: bool,
}

/// Operation context handed to [`ActionTable`] implementations.
///
/// Gives access to the backing connection, the router's object pools, and
/// the reference-counted transaction frame.
pub struct StoreContext<'a> {
    router: &'a ResourceRouter,
}

impl<'a> StoreContext<'a> {
    pub(crate) fn new(router: &'a ResourceRouter) -> Self {
        Self { router }
    }

    /// The backing store connection.
    pub fn conn(&self) -> &Connection {
        self.router.conn()
    }

    /// Borrows a pooled query expression.
    pub fn expression(&self) -> StoreResult<Pooled<'a, QueryExpression>> {
        self.router.expression()
    }

    /// Borrows a pooled value set.
    pub fn values(&self) -> StoreResult<Pooled<'a, ValueSet>> {
        self.router.values()
    }

    pub fn begin_transaction(&self) -> StoreResult<()> {
        self.router.begin_transaction()
    }

    pub fn set_transaction_successful(&self) -> StoreResult<()> {
        self.router.set_transaction_successful()
    }

    pub fn end_transaction(&self) -> StoreResult<()> {
        self.router.end_transaction()
    }
}

/// CRUD operations bound to one logical table.
///
/// Implementations receive the annotation-stripped address; notification is
/// the router's responsibility and happens after the operation returns.
pub trait ActionTable: Send + Sync {
    /// Deletes matching rows, returning the affected-row count.
    fn delete(&self, ctx: &StoreContext<'_>, binding: &TableBinding, address: &Address, extra: Option<&QueryExpression>)
        -> StoreResult<usize>;

    /// Inserts one row, returning the address of the new row.
    fn insert(&self, ctx: &StoreContext<'_>, binding: &TableBinding, address: &Address, values: &ValueSet) -> StoreResult<Address>;

    /// Updates matching rows, returning the affected-row count.
    fn update(
        &self,
        ctx: &StoreContext<'_>,
        binding: &TableBinding,
        address: &Address,
        values: &ValueSet,
        extra: Option<&QueryExpression>,
    ) -> StoreResult<usize>;

    /// Reads matching rows into a materialized [`RowSet`].
    fn query(
        &self,
        ctx: &StoreContext<'_>,
        binding: &TableBinding,
        address: &Address,
        columns: Option<&[&str]>,
        extra: Option<&QueryExpression>,
        ordering: Option<&str>,
    ) -> StoreResult<RowSet>;

    /// Inserts a batch of rows atomically inside one transaction.
    ///
    /// Any failed row aborts the whole batch; nothing is committed.
    fn bulk_insert(&self, ctx: &StoreContext<'_>, binding: &TableBinding, address: &Address, rows: &[ValueSet]) -> StoreResult<usize>;
}

/// Stock [`ActionTable`] implementation used by every binding unless the
/// caller supplies its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultActionTable;

impl ActionTable for DefaultActionTable {
    fn delete(
        &self,
        ctx: &StoreContext<'_>,
        binding: &TableBinding,
        address: &Address,
        extra: Option<&QueryExpression>,
    ) -> StoreResult<usize> {
        let (filter, args) = scoped_filter(ctx, binding, address, extra)?;
        let sql = format!("DELETE FROM {}{}", binding.table, where_clause(&filter));
        let params = text_params(&args);
        Ok(ctx.conn().execute(&sql, params_from_iter(params.iter()))?)
    }

    fn insert(&self, ctx: &StoreContext<'_>, binding: &TableBinding, address: &Address, values: &ValueSet) -> StoreResult<Address> {
        if binding.by_identity {
            return Err(StoreError::IdentityInsert(address.to_string()));
        }
        let identity = insert_row(ctx.conn(), &binding.table, values)?;
        Ok(address.joined(identity))
    }

    fn update(
        &self,
        ctx: &StoreContext<'_>,
        binding: &TableBinding,
        address: &Address,
        values: &ValueSet,
        extra: Option<&QueryExpression>,
    ) -> StoreResult<usize> {
        // No assignments, no statement to run.
        if values.is_empty() {
            return Ok(0);
        }
        let (filter, args) = scoped_filter(ctx, binding, address, extra)?;
        let assignments: Vec<String> = values.columns().map(|(column, _)| format!("{column} = ?")).collect();
        let sql = format!("UPDATE {} SET {}{}", binding.table, assignments.join(", "), where_clause(&filter));
        let mut params: Vec<Value> = values.columns().map(|(_, value)| value.clone()).collect();
        params.extend(text_params(&args));
        Ok(ctx.conn().execute(&sql, params_from_iter(params.iter()))?)
    }

    fn query(
        &self,
        ctx: &StoreContext<'_>,
        binding: &TableBinding,
        address: &Address,
        columns: Option<&[&str]>,
        extra: Option<&QueryExpression>,
        ordering: Option<&str>,
    ) -> StoreResult<RowSet> {
        let (filter, args) = scoped_filter(ctx, binding, address, extra)?;
        let sql = select_sql(&binding.table, columns, &filter, ordering);
        let mut stmt = ctx.conn().prepare(&sql)?;
        fetch_rows(&mut stmt, &text_params(&args))
    }

    fn bulk_insert(&self, ctx: &StoreContext<'_>, binding: &TableBinding, address: &Address, rows: &[ValueSet]) -> StoreResult<usize> {
        if binding.by_identity {
            return Err(StoreError::IdentityInsert(address.to_string()));
        }
        ctx.begin_transaction()?;
        let mut outcome = rows
            .iter()
            .try_fold(0usize, |count, values| insert_row(ctx.conn(), &binding.table, values).map(|_| count + 1));
        if outcome.is_ok() {
            if let Err(err) = ctx.set_transaction_successful() {
                outcome = Err(err);
            }
        }
        // The transaction must close on both paths; an unmarked frame rolls
        // the whole batch back.
        let ended = ctx.end_transaction();
        match outcome {
            Ok(count) => ended.map(|()| count),
            Err(err) => Err(err),
        }
    }
}

/// Composes the effective filter for an operation.
///
/// Row-addressed bindings extract the trailing identity and build
/// `id = ? AND (extra)` through a pooled expression; collection bindings
/// pass `extra` through unchanged. Returns the rendered predicate together
/// with its positional arguments; an empty predicate means "no WHERE".
pub(crate) fn scoped_filter(
    ctx: &StoreContext<'_>,
    binding: &TableBinding,
    address: &Address,
    extra: Option<&QueryExpression>,
) -> StoreResult<(String, Vec<String>)> {
    if binding.by_identity {
        let identity = address
            .row_identity()
            .ok_or_else(|| StoreError::MissingIdentity(address.to_string()))?;
        let mut expr = ctx.expression()?;
        expr.expr(IDENTITY_COLUMN, Operator::Equals, identity);
        if let Some(extra) = extra.filter(|e| !e.is_empty()) {
            let raw_args: Vec<&str> = extra.arguments().iter().map(String::as_str).collect();
            expr.and().append_raw(&format!("({})", extra.predicate()), &raw_args);
        }
        Ok((expr.predicate().to_string(), expr.arguments().to_vec()))
    } else {
        match extra.filter(|e| !e.is_empty()) {
            Some(extra) => Ok((extra.predicate().to_string(), extra.arguments().to_vec())),
            None => Ok((String::new(), Vec::new())),
        }
    }
}

pub(crate) fn select_sql(table: &str, columns: Option<&[&str]>, filter: &str, ordering: Option<&str>) -> String {
    let projection = match columns {
        Some(columns) if !columns.is_empty() => columns.join(", "),
        _ => "*".to_string(),
    };
    let mut sql = format!("SELECT {projection} FROM {table}{}", where_clause(filter));
    if let Some(ordering) = ordering.filter(|o| !o.trim().is_empty()) {
        sql.push_str(" ORDER BY ");
        sql.push_str(ordering);
    }
    sql
}

pub(crate) fn text_params(args: &[String]) -> Vec<Value> {
    args.iter().map(|a| Value::Text(a.clone())).collect()
}

fn where_clause(filter: &str) -> String {
    if filter.is_empty() {
        String::new()
    } else {
        format!(" WHERE {filter}")
    }
}

fn insert_row(conn: &Connection, table: &str, values: &ValueSet) -> StoreResult<i64> {
    if values.is_empty() {
        conn.execute(&format!("INSERT INTO {table} DEFAULT VALUES"), [])?;
    } else {
        let columns: Vec<&str> = values.columns().map(|(column, _)| column).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!("INSERT INTO {table} ({}) VALUES ({placeholders})", columns.join(", "));
        let params: Vec<Value> = values.columns().map(|(_, value)| value.clone()).collect();
        conn.execute(&sql, params_from_iter(params.iter()))?;
    }
    Ok(conn.last_insert_rowid())
}
