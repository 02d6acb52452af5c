//! Ordered schema migration runner.
//!
//! Evolves the backing store's schema in strict version order. The runner
//! holds a registry of `(version, name, step)` entries; upgrading from
//! version `old` to `new` executes every step for `old+1 ..= new`, in
//! increasing order, inside one transaction. A fresh store upgrades from
//! version `0`. No step is ever skipped or reordered: a hole in the
//! registry inside the upgrade range fails the upgrade, as does a failing
//! step — the whole transaction rolls back and store initialization aborts.
//!
//! The applied version is recorded in SQLite's `user_version` pragma,
//! written inside the same transaction as the steps.
//!
//! ## Usage
//!
//! ```rust
//! use quarry::db::migrations::MigrationRunner;
//!
//! let mut runner = MigrationRunner::new();
//! runner.step(1, "create_tracks", |tx| {
//!     tx.execute("CREATE TABLE tracks (id INTEGER PRIMARY KEY, title TEXT NOT NULL)", [])?;
//!     Ok(())
//! });
//! runner.step(2, "index_titles", |tx| {
//!     tx.execute("CREATE INDEX idx_tracks_title ON tracks(title)", [])?;
//!     Ok(())
//! });
//!
//! let mut conn = rusqlite::Connection::open_in_memory()?;
//! runner.run(&mut conn)?;
//! # Ok::<(), quarry::StoreError>(())
//! ```

use crate::error::{StoreError, StoreResult};
use rusqlite::{Connection, Transaction};
use tracing::{debug, info};

/// A single schema migration step.
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> anyhow::Result<()>,
}

/// Registry and executor of ordered schema migrations.
#[derive(Default)]
pub struct MigrationRunner {
    migrations: Vec<Migration>,
}

impl MigrationRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a migration step.
    ///
    /// # Panics
    ///
    /// Versions must be registered in strictly increasing order starting
    /// above zero; anything else is a programmer error and panics at
    /// registration time.
    pub fn step(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> anyhow::Result<()>) -> &mut Self {
        let last = self.migrations.last().map(|m| m.version).unwrap_or(0);
        assert!(version > last, "migration version {version} must be greater than {last}");
        self.migrations.push(Migration { version, name, up });
        self
    }

    /// Latest registered version, or `0` with an empty registry.
    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    /// Applies every step for versions `old+1 ..= new`, in order, inside
    /// one transaction, and records `new` in `user_version`.
    ///
    /// `apply(v, v)` invokes nothing. A missing or failing step aborts the
    /// whole upgrade; the store is left at version `old`.
    pub fn apply(&self, conn: &mut Connection, old: u32, new: u32) -> StoreResult<()> {
        if new <= old {
            debug!(version = old, "schema is up to date");
            return Ok(());
        }
        let tx = conn.transaction()?;
        for version in old + 1..=new {
            let migration = self
                .migrations
                .iter()
                .find(|m| m.version == version)
                .ok_or(StoreError::MissingMigration { version })?;
            info!(version, name = migration.name, "applying migration");
            (migration.up)(&tx).map_err(|source| StoreError::MigrationFailed {
                version,
                name: migration.name,
                source,
            })?;
        }
        tx.pragma_update(None, "user_version", new)?;
        tx.commit()?;
        info!(from = old, to = new, "migrations applied");
        Ok(())
    }

    /// Upgrades the connection from its current `user_version` to the
    /// latest registered version.
    pub fn run(&self, conn: &mut Connection) -> StoreResult<()> {
        let current = current_version(conn)?;
        self.apply(conn, current, self.latest_version())
    }
}

/// Reads the store's current schema version from `user_version`.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    let version: u32 = conn.query_row("SELECT * FROM pragma_user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// True when the store is behind the runner's latest registered version.
pub fn needs_migration(conn: &Connection, runner: &MigrationRunner) -> StoreResult<bool> {
    Ok(current_version(conn)? < runner.latest_version())
}
