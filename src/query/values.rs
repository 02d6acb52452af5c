//! Column/value accumulation for insert and update writes.
//!
//! A [`ValueSet`] collects column-name/value pairs (last write per column
//! wins) together with a side map of address annotations, then performs the
//! write through a [`ResourceRouter`]. Every write call clears the
//! accumulator afterwards, success or failure: a reused instance always
//! starts its next write from an empty state. Like the expression builder,
//! a single instance is sequential-use and must not be shared across
//! concurrent writers.

use crate::error::{StoreError, StoreResult};
use crate::pool::Reusable;
use crate::provider::address::{Address, PARAM_NOTIFY, PARAM_SYNC};
use crate::provider::router::ResourceRouter;
use crate::query::expression::QueryExpression;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use std::collections::BTreeMap;

/// Conversion into a stored SQLite value.
///
/// Date and time values format to the text shapes used throughout the
/// schema (`%Y-%m-%d`, `%Y-%m-%d %H:%M:%S`).
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(if self { 1 } else { 0 })
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Blob(self)
    }
}

impl IntoValue for NaiveDate {
    fn into_value(self) -> Value {
        Value::Text(self.format("%Y-%m-%d").to_string())
    }
}

impl IntoValue for NaiveDateTime {
    fn into_value(self) -> Value {
        Value::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }
}

/// Accumulator for insert/update column values and address annotations.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    values: BTreeMap<String, Value>,
    annotations: BTreeMap<String, String>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value; a later `put` for the same column replaces it.
    pub fn put(&mut self, column: &str, value: impl IntoValue) -> &mut Self {
        self.values.insert(column.to_string(), value.into_value());
        self
    }

    /// Sets a column to SQL NULL.
    pub fn put_null(&mut self, column: &str) -> &mut Self {
        self.values.insert(column.to_string(), Value::Null);
        self
    }

    /// Attaches an annotation that will be appended to the target address.
    pub fn annotate(&mut self, key: &str, value: &str) -> &mut Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    /// Suppresses the change notification for the next write.
    pub fn silently(&mut self) -> &mut Self {
        self.annotate(PARAM_NOTIFY, "0")
    }

    /// Flags the next write's notification for the sync channel.
    pub fn through_sync(&mut self) -> &mut Self {
        self.annotate(PARAM_SYNC, "1")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Accumulated columns in stable (name) order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drops all accumulated values and annotations.
    pub fn clear(&mut self) {
        self.values.clear();
        self.annotations.clear();
    }

    /// Inserts the accumulated values through the router.
    ///
    /// Returns the newly assigned row identity. The accumulator is cleared
    /// before returning, on both the success and the failure path.
    pub fn insert(&mut self, router: &ResourceRouter, address: &Address) -> StoreResult<i64> {
        let target = self.annotated(address);
        let result = router.insert(&target, self).and_then(|row_address| {
            row_address
                .row_identity()
                .ok_or_else(|| StoreError::MissingIdentity(row_address.to_string()))
        });
        self.clear();
        result
    }

    /// Updates the row with the given identity. Clears the accumulator
    /// before returning.
    pub fn update_by_identity(&mut self, router: &ResourceRouter, address: &Address, identity: i64) -> StoreResult<usize> {
        let target = self.annotated(&address.joined(identity));
        let result = router.update(&target, self, None);
        self.clear();
        result
    }

    /// Updates every row matching `filter`. Clears the accumulator before
    /// returning.
    pub fn update_where(&mut self, router: &ResourceRouter, address: &Address, filter: &QueryExpression) -> StoreResult<usize> {
        let target = self.annotated(address);
        let result = router.update(&target, self, Some(filter));
        self.clear();
        result
    }

    fn annotated(&self, address: &Address) -> Address {
        let mut target = address.clone();
        for (key, value) in &self.annotations {
            target = target.with_param(key, value);
        }
        target
    }
}

impl Reusable for ValueSet {
    fn reset(&mut self) {
        self.clear();
    }
}
