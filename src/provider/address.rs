//! Resource addresses: opaque locators for tables and rows.
//!
//! An [`Address`] is a sequence of path segments with optional key/value
//! annotations, written `segment/segment?key=value&key=value`. An address
//! names either a whole table (`tracks`) or a single row within it
//! (`tracks/42`). Two annotations are consumed by the router on every
//! operation and stripped before the address reaches the backing store:
//! `notify` (default on) and `sync` (default off).

use crate::error::{StoreError, StoreResult};
use std::fmt;
use std::str::FromStr;

/// Annotation controlling whether a successful write emits a change
/// notification. Absent means "notify".
pub const PARAM_NOTIFY: &str = "notify";

/// Annotation flagging the notification for the sync channel as well.
/// Absent means "local only".
pub const PARAM_SYNC: &str = "sync";

/// Opaque locator identifying a table or a single row within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    segments: Vec<String>,
    params: Vec<(String, String)>,
}

impl Address {
    /// Builds an address from path segments, without annotations.
    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            params: Vec::new(),
        }
    }

    /// Parses `a/b/c?k=v&k2=v2` into segments and annotations.
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };
        if path.is_empty() || path.split('/').any(|s| s.is_empty()) {
            return Err(StoreError::BadAddress(raw.to_string()));
        }
        let segments = path.split('/').map(str::to_string).collect();
        let mut params = Vec::new();
        if let Some(query) = query {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some((key, value)) if !key.is_empty() => params.push((key.to_string(), value.to_string())),
                    _ => return Err(StoreError::BadAddress(raw.to_string())),
                }
            }
        }
        Ok(Self { segments, params })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last path segment, if any.
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The trailing segment interpreted as a row identity.
    ///
    /// Identities are non-negative; a trailing segment that is not a
    /// non-negative integer yields `None`.
    pub fn row_identity(&self) -> Option<i64> {
        self.last_segment()?.parse::<i64>().ok().filter(|id| *id >= 0)
    }

    /// Returns the address extended with one more path segment.
    pub fn joined(&self, segment: impl fmt::Display) -> Address {
        let mut extended = self.clone();
        extended.segments.push(segment.to_string());
        extended
    }

    /// First value for an annotation key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Returns the address with an annotation set (replacing any previous
    /// value for the key).
    pub fn with_param(&self, key: &str, value: &str) -> Address {
        let mut updated = self.clone();
        updated.params.retain(|(k, _)| k != key);
        updated.params.push((key.to_string(), value.to_string()));
        updated
    }

    /// Reads and strips the router dispatch annotations.
    ///
    /// Returns the cleaned address plus the effective notify (default true)
    /// and sync (default false) flags. The annotations are read once here
    /// and never forwarded to the backing store.
    pub(crate) fn dispatch_flags(&self) -> (Address, bool, bool) {
        let notify = self.param(PARAM_NOTIFY).map(truthy).unwrap_or(true);
        let sync = self.param(PARAM_SYNC).map(truthy).unwrap_or(false);
        let mut cleaned = self.clone();
        cleaned.params.retain(|(k, _)| k != PARAM_NOTIFY && k != PARAM_SYNC);
        (cleaned, notify, sync)
    }
}

fn truthy(value: &str) -> bool {
    !matches!(value, "0" | "false")
}

impl FromStr for Address {
    type Err = StoreError;

    fn from_str(raw: &str) -> StoreResult<Self> {
        Self::parse(raw)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            write!(f, "{}{}={}", if i == 0 { '?' } else { '&' }, key, value)?;
        }
        Ok(())
    }
}
