//! The resource router: single entry point for address-dispatched CRUD.
//!
//! A [`ResourceRouter`] owns the backing SQLite connection, an immutable set
//! of table bindings built through [`RouterBuilder`], the shared object
//! pools, the change-observer registry, and the explicit transaction state.
//! Every inbound operation strips the notify/sync annotations from the
//! address, resolves the binding through the pattern matcher, delegates to
//! the bound [`ActionTable`], and — for writes that completed — emits a
//! change notification afterwards. Reads never notify, and neither do
//! failed writes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quarry::provider::router::RouterBuilder;
//! use quarry::provider::address::Address;
//! use quarry::query::ValueSet;
//! # let conn = rusqlite::Connection::open_in_memory().unwrap();
//!
//! let router = RouterBuilder::new(conn)
//!     .collection("tracks", 1, "tracks")
//!     .row("tracks/#", 2, "tracks")
//!     .build();
//!
//! let mut values = ValueSet::new();
//! values.put("title", "Aja");
//! let id = values.insert(&router, &Address::parse("tracks")?)?;
//! # Ok::<(), quarry::StoreError>(())
//! ```

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::pool::{Pool, Pooled};
use crate::provider::address::Address;
use crate::provider::cursor::{RecordQuery, RowSet, StoredRow};
use crate::provider::matcher::AddressMatcher;
use crate::provider::table::{scoped_filter, select_sql, text_params, ActionTable, DefaultActionTable, StoreContext, TableBinding};
use crate::query::expression::QueryExpression;
use crate::query::values::ValueSet;
use parking_lot::{Mutex, RwLock};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Callback invoked after a successful, notification-enabled write.
///
/// The write has already committed when this runs; implementations cannot
/// fail the operation, only react to it.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, address: &Address, through_sync: bool);
}

#[derive(Default)]
struct TxState {
    marked: Vec<bool>,
    failed: bool,
}

struct Binding {
    table: TableBinding,
    actions: Arc<dyn ActionTable>,
}

/// Construction-time configuration of a [`ResourceRouter`].
///
/// Bindings are registered against numeric codes and address patterns;
/// the resulting binding table is immutable for the router's lifetime.
pub struct RouterBuilder {
    conn: Connection,
    config: StoreConfig,
    matcher: AddressMatcher,
    bindings: HashMap<u32, Binding>,
}

impl RouterBuilder {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            config: StoreConfig::default(),
            matcher: AddressMatcher::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds a collection pattern: addresses name the whole table.
    pub fn collection(self, pattern: &str, code: u32, table: &str) -> Self {
        self.bind(pattern, code, table, false)
    }

    /// Binds a row pattern: addresses end with a literal identity segment.
    pub fn row(self, pattern: &str, code: u32, table: &str) -> Self {
        self.bind(pattern, code, table, true)
    }

    /// Replaces the [`ActionTable`] for an already-registered code.
    ///
    /// # Panics
    ///
    /// Panics when the code is unknown; bindings are fixed at construction
    /// and a typo here is a programmer error.
    pub fn actions(mut self, code: u32, actions: Arc<dyn ActionTable>) -> Self {
        let binding = self
            .bindings
            .get_mut(&code)
            .unwrap_or_else(|| panic!("no binding registered for code {code}"));
        binding.actions = actions;
        self
    }

    fn bind(mut self, pattern: &str, code: u32, table: &str, by_identity: bool) -> Self {
        assert!(!self.bindings.contains_key(&code), "duplicate binding code {code}");
        self.matcher.route(pattern, code);
        self.bindings.insert(
            code,
            Binding {
                table: TableBinding {
                    table: table.to_string(),
                    by_identity,
                },
                actions: Arc::new(DefaultActionTable),
            },
        );
        self
    }

    pub fn build(self) -> ResourceRouter {
        ResourceRouter {
            conn: self.conn,
            matcher: self.matcher,
            bindings: self.bindings,
            observers: RwLock::new(Vec::new()),
            expressions: Pool::new(self.config.pool_capacity, self.config.pool_acquire),
            value_sets: Pool::new(self.config.pool_capacity, self.config.pool_acquire),
            tx: Mutex::new(TxState::default()),
        }
    }
}

/// Address-dispatched CRUD entry point owning the backing store handle.
pub struct ResourceRouter {
    conn: Connection,
    matcher: AddressMatcher,
    bindings: HashMap<u32, Binding>,
    observers: RwLock<Vec<(String, Arc<dyn ChangeObserver>)>>,
    expressions: Pool<QueryExpression>,
    value_sets: Pool<ValueSet>,
    tx: Mutex<TxState>,
}

impl ResourceRouter {
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Borrows a pooled query expression.
    pub fn expression(&self) -> StoreResult<Pooled<'_, QueryExpression>> {
        self.expressions.acquire()
    }

    /// Borrows a pooled value set.
    pub fn values(&self) -> StoreResult<Pooled<'_, ValueSet>> {
        self.value_sets.acquire()
    }

    /// Registers an observer for addresses whose first segment equals
    /// `prefix`.
    pub fn observe(&self, prefix: &str, observer: Arc<dyn ChangeObserver>) {
        self.observers.write().push((prefix.to_string(), observer));
    }

    /// Deletes rows addressed by `address`, AND-composed with `extra`.
    pub fn delete(&self, address: &Address, extra: Option<&QueryExpression>) -> StoreResult<usize> {
        let (binding, cleaned, notify, sync) = self.resolve(address)?;
        let removed = binding.actions.delete(&StoreContext::new(self), &binding.table, &cleaned, extra)?;
        debug!(table = %binding.table.table, rows = removed, "delete");
        if notify {
            self.notify_change(&cleaned, sync);
        }
        Ok(removed)
    }

    /// Inserts one row, returning the new row's address.
    pub fn insert(&self, address: &Address, values: &ValueSet) -> StoreResult<Address> {
        let (binding, cleaned, notify, sync) = self.resolve(address)?;
        let row_address = binding.actions.insert(&StoreContext::new(self), &binding.table, &cleaned, values)?;
        debug!(table = %binding.table.table, row = %row_address, "insert");
        if notify {
            self.notify_change(&row_address, sync);
        }
        Ok(row_address)
    }

    /// Updates addressed rows, returning the affected-row count.
    pub fn update(&self, address: &Address, values: &ValueSet, extra: Option<&QueryExpression>) -> StoreResult<usize> {
        let (binding, cleaned, notify, sync) = self.resolve(address)?;
        let changed = binding
            .actions
            .update(&StoreContext::new(self), &binding.table, &cleaned, values, extra)?;
        debug!(table = %binding.table.table, rows = changed, "update");
        if notify {
            self.notify_change(&cleaned, sync);
        }
        Ok(changed)
    }

    /// Reads addressed rows into a materialized [`RowSet`]. Never notifies.
    pub fn query(
        &self,
        address: &Address,
        columns: Option<&[&str]>,
        extra: Option<&QueryExpression>,
        ordering: Option<&str>,
    ) -> StoreResult<RowSet> {
        let (binding, cleaned, _, _) = self.resolve(address)?;
        binding
            .actions
            .query(&StoreContext::new(self), &binding.table, &cleaned, columns, extra, ordering)
    }

    /// Inserts a batch atomically; either every row lands or none do.
    pub fn bulk_insert(&self, address: &Address, rows: &[ValueSet]) -> StoreResult<usize> {
        let (binding, cleaned, notify, sync) = self.resolve(address)?;
        let inserted = binding.actions.bulk_insert(&StoreContext::new(self), &binding.table, &cleaned, rows)?;
        debug!(table = %binding.table.table, rows = inserted, "bulk insert");
        if notify {
            self.notify_change(&cleaned, sync);
        }
        Ok(inserted)
    }

    /// Eagerly materializes addressed rows into records via `factory`.
    pub fn select_records<R, F>(
        &self,
        address: &Address,
        extra: Option<&QueryExpression>,
        ordering: Option<&str>,
        factory: F,
    ) -> StoreResult<Vec<R>>
    where
        F: FnMut(&StoredRow) -> StoreResult<R>,
    {
        let mut query = self.record_query(address, None, extra, ordering)?;
        let mut cursor = query.run(factory)?;
        let mut records = Vec::new();
        while let Some(record) = cursor.next_record()? {
            records.push(record);
        }
        cursor.close()?;
        Ok(records)
    }

    /// Opens a lazy typed read over the addressed rows.
    ///
    /// The returned query borrows the router's connection; run it with a
    /// row-to-record factory and close the cursor after use.
    pub fn record_query(
        &self,
        address: &Address,
        columns: Option<&[&str]>,
        extra: Option<&QueryExpression>,
        ordering: Option<&str>,
    ) -> StoreResult<RecordQuery<'_>> {
        let (binding, cleaned, _, _) = self.resolve(address)?;
        let (filter, args) = scoped_filter(&StoreContext::new(self), &binding.table, &cleaned, extra)?;
        let sql = select_sql(&binding.table.table, columns, &filter, ordering);
        let stmt = self.conn.prepare(&sql)?;
        Ok(RecordQuery::new(stmt, text_params(&args)))
    }

    /// Opens a transaction frame; only the outermost frame touches SQLite.
    pub fn begin_transaction(&self) -> StoreResult<()> {
        let mut tx = self.tx.lock();
        if tx.marked.is_empty() {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
            tx.failed = false;
        }
        tx.marked.push(false);
        Ok(())
    }

    /// Marks the current frame successful.
    pub fn set_transaction_successful(&self) -> StoreResult<()> {
        let mut tx = self.tx.lock();
        match tx.marked.last_mut() {
            None => Err(StoreError::NoActiveTransaction),
            Some(true) => Err(StoreError::TransactionMarkedTwice),
            Some(marked) => {
                *marked = true;
                Ok(())
            }
        }
    }

    /// Closes the current frame. When the outermost frame closes, the
    /// transaction commits only if every frame was marked successful;
    /// otherwise it rolls back.
    pub fn end_transaction(&self) -> StoreResult<()> {
        let mut tx = self.tx.lock();
        let marked = tx.marked.pop().ok_or(StoreError::NoActiveTransaction)?;
        if !marked {
            tx.failed = true;
        }
        if tx.marked.is_empty() {
            if tx.failed {
                warn!("transaction rolled back: unmarked frame");
                self.conn.execute_batch("ROLLBACK")?;
            } else {
                self.conn.execute_batch("COMMIT")?;
            }
            tx.failed = false;
        }
        Ok(())
    }

    fn resolve(&self, address: &Address) -> StoreResult<(&Binding, Address, bool, bool)> {
        let code = self
            .matcher
            .resolve(address)
            .ok_or_else(|| StoreError::UnknownAddress(address.to_string()))?;
        let binding = self
            .bindings
            .get(&code)
            .ok_or_else(|| StoreError::UnknownAddress(address.to_string()))?;
        let (cleaned, notify, sync) = address.dispatch_flags();
        Ok((binding, cleaned, notify, sync))
    }

    fn notify_change(&self, address: &Address, through_sync: bool) {
        let observers = self.observers.read();
        for (prefix, observer) in observers.iter() {
            if address.segments().first().map(String::as_str) == Some(prefix.as_str()) {
                trace!(address = %address, through_sync, "notify change");
                observer.on_change(address, through_sync);
            }
        }
    }
}
