//! Resource-address-dispatched CRUD: addresses, pattern matching, table
//! actions, the router, and row cursors.

/// Resource addresses: path segments plus key/value annotations.
pub mod address;

/// Row materialization and the lazy record cursor.
pub mod cursor;

/// Address pattern matching for table dispatch.
pub mod matcher;

/// The single CRUD entry point owning the backing store handle.
pub mod router;

/// The per-table CRUD contract and its default implementation.
pub mod table;

pub use address::{Address, PARAM_NOTIFY, PARAM_SYNC};
pub use cursor::{RecordCursor, RecordQuery, RowSet, StoredRow};
pub use matcher::AddressMatcher;
pub use router::{ChangeObserver, ResourceRouter, RouterBuilder};
pub use table::{ActionTable, DefaultActionTable, StoreContext, TableBinding, IDENTITY_COLUMN};
