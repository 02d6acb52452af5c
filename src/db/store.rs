//! Connection open and bootstrap.
//!
//! The single place a backing store connection comes from. Opening a store
//! configures connection pragmas (`foreign_keys=ON`, the configured busy
//! timeout) and applies pending schema migrations before returning, so a
//! returned connection is always at the latest registered version.

use crate::config::StoreConfig;
use crate::db::migrations::MigrationRunner;
use crate::error::StoreResult;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Opens a file-backed store and applies pending migrations.
pub fn open_store(path: impl AsRef<Path>, config: &StoreConfig, runner: &MigrationRunner) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    bootstrap(conn, config, runner)
}

/// Opens an in-memory store and applies pending migrations.
pub fn open_store_in_memory(config: &StoreConfig, runner: &MigrationRunner) -> StoreResult<Connection> {
    let conn = Connection::open_in_memory()?;
    bootstrap(conn, config, runner)
}

fn bootstrap(mut conn: Connection, config: &StoreConfig, runner: &MigrationRunner) -> StoreResult<Connection> {
    conn.execute_batch("PRAGMA foreign_keys = ON")?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    runner.run(&mut conn)?;
    debug!(version = runner.latest_version(), "store opened");
    Ok(conn)
}
