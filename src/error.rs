//! Error types for the storage core.
//!
//! Every fallible operation in the crate returns [`StoreResult`]. The variants
//! distinguish the failure classes callers react to differently: backing-store
//! errors propagate from SQLite, pool exhaustion is recoverable, and the
//! precondition variants (closed cursor, unbalanced transaction, unpersisted
//! record) mark programmer errors that must not be silently ignored.

use thiserror::Error;

/// Result alias used across the crate.
pub type StoreResult<T> = Result<T, StoreError>;

/// Unified error type of the storage core.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite read/write failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Address text could not be parsed into segments and annotations.
    #[error("invalid resource address: {0}")]
    BadAddress(String),

    /// No table binding matched the address.
    #[error("no table bound for address '{0}'")]
    UnknownAddress(String),

    /// A row-addressed binding received an address without a trailing identity.
    #[error("address '{0}' does not end with a row identity")]
    MissingIdentity(String),

    /// Insert into a binding that expects an identity in the address.
    #[error("insert through row-addressed binding '{0}' is unsupported")]
    IdentityInsert(String),

    /// Lifecycle call that requires a persisted record (identity > 0).
    #[error("record has no identity yet, nothing to delete")]
    NotPersisted,

    /// A pooled object could not be acquired in fail-fast mode.
    #[error("object pool exhausted ({capacity} slots all in use)")]
    PoolExhausted { capacity: usize },

    /// Pull or close on a record cursor that was already closed.
    #[error("record cursor is already closed")]
    CursorClosed,

    /// Transaction end or mark without a matching begin.
    #[error("no active transaction")]
    NoActiveTransaction,

    /// The current transaction frame was already marked successful.
    #[error("transaction already marked successful")]
    TransactionMarkedTwice,

    /// A requested column is absent from the row or holds an unexpected type.
    #[error("column '{0}' is missing or has an unexpected type")]
    Column(String),

    /// The runner has no step registered for a version inside the upgrade range.
    #[error("no migration step registered for version {version}")]
    MissingMigration { version: u32 },

    /// A migration step failed; the whole upgrade was rolled back.
    #[error("migration step {version} ({name}) failed: {source}")]
    MigrationFailed {
        version: u32,
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}
