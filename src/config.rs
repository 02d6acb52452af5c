//! Runtime configuration for the storage core.
//!
//! Controls the sizing of the internal object pools and the connection
//! bootstrap parameters. The configuration can be built in code, taken from
//! [`StoreConfig::default`], or loaded from a JSON file.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quarry::config::{AcquireMode, StoreConfig};
//!
//! let mut config = StoreConfig::default();
//! config.pool_capacity = 16;
//! config.pool_acquire = AcquireMode::Block;
//! config.save("store.json")?;
//! # Ok::<(), quarry::StoreError>(())
//! ```

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Behavior of pool acquisition when every slot is checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireMode {
    /// Return [`StoreError::PoolExhausted`] immediately.
    #[default]
    FailFast,
    /// Block until another caller releases a slot.
    Block,
}

/// Tunable settings applied at store open and router construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of pre-allocated slots in each object pool.
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,

    /// What `acquire` does when the pool is empty.
    #[serde(default)]
    pub pool_acquire: AcquireMode,

    /// SQLite busy timeout applied during connection bootstrap.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_pool_capacity() -> usize {
    8
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_capacity: default_pool_capacity(),
            pool_acquire: AcquireMode::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// A missing file is not an error: defaults are returned so a store can
    /// run without any configuration on disk.
    pub fn read(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| StoreError::Config(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Writes the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))?;
        fs::write(path, raw).map_err(|e| StoreError::Config(e.to_string()))
    }
}
