//! Backing store access: connection bootstrap and schema migrations.

/// Ordered schema migration runner.
pub mod migrations;

/// Connection open and bootstrap.
pub mod store;

pub use migrations::{current_version, needs_migration, MigrationRunner};
pub use store::{open_store, open_store_in_memory};
