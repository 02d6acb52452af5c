//! Query composition: predicate building and value accumulation.

/// Fluent boolean predicate builder with positional argument binding.
pub mod expression;

/// Column/value accumulation for insert and update writes.
pub mod values;

pub use expression::{ArgValue, Operator, QueryExpression, SqlKeyword};
pub use values::{IntoValue, ValueSet};
