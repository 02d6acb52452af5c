//! # Quarry - embedded relational-access core
//!
//! A compact data layer over SQLite: fluent predicate building, an
//! accumulating value writer, record save/delete/reload lifecycle,
//! resource-address-routed CRUD dispatch, and ordered schema migrations.
//!
//! ## Features
//!
//! - **Query Expressions**: chainable boolean predicates with positional
//!   argument binding that stays in lockstep with the placeholder count
//! - **Value Sets**: insert/update accumulators with notify/sync address
//!   annotations
//! - **Records**: active-record lifecycle on top of the router
//! - **Routing**: one entry point dispatching CRUD by resource address,
//!   with observer notification and explicit transactions
//! - **Migrations**: strictly ordered, transactional schema upgrades
//!
//! ## Usage
//!
//! ```rust
//! use quarry::db::migrations::MigrationRunner;
//! use quarry::db::store::open_store_in_memory;
//! use quarry::config::StoreConfig;
//! use quarry::provider::address::Address;
//! use quarry::provider::router::RouterBuilder;
//! use quarry::query::ValueSet;
//!
//! let mut runner = MigrationRunner::new();
//! runner.step(1, "create_tracks", |tx| {
//!     tx.execute("CREATE TABLE tracks (id INTEGER PRIMARY KEY, title TEXT NOT NULL)", [])?;
//!     Ok(())
//! });
//!
//! let conn = open_store_in_memory(&StoreConfig::default(), &runner)?;
//! let router = RouterBuilder::new(conn)
//!     .collection("tracks", 1, "tracks")
//!     .row("tracks/#", 2, "tracks")
//!     .build();
//!
//! let mut values = ValueSet::new();
//! values.put("title", "Peg");
//! let id = values.insert(&router, &Address::parse("tracks")?)?;
//! assert!(id > 0);
//! # Ok::<(), quarry::StoreError>(())
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod pool;
pub mod provider;
pub mod query;
pub mod record;

pub use error::{StoreError, StoreResult};
