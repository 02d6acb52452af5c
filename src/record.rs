//! Active-record style entity lifecycle.
//!
//! A [`Record`] is one row's worth of state: a 64-bit non-negative identity
//! (`0` meaning "not yet persisted") plus entity-specific columns mapped by
//! the implementor. The trait supplies the `save`/`delete`/`reload`
//! lifecycle on top of four mapping methods; every call borrows the router
//! for its duration — a record never owns the store connection.
//!
//! Lifecycle rules:
//!
//! - `save` inserts when the identity is `0` (assigning the new identity in
//!   place) and updates by identity otherwise.
//! - `delete` rejects unpersisted records and leaves the identity unchanged
//!   after a successful removal; callers discard the instance or reset the
//!   identity themselves.
//! - `reload` is a no-op on unpersisted records; a vanished row leaves the
//!   in-memory attributes untouched, and detecting that case is the
//!   caller's separate concern.
//!
//! A failed store operation propagates before any identity or dirty-state
//! mutation. `mark_clean` runs after every successful lifecycle call.

use crate::error::{StoreError, StoreResult};
use crate::provider::address::Address;
use crate::provider::cursor::StoredRow;
use crate::provider::router::ResourceRouter;
use crate::query::values::ValueSet;

/// Row-backed entity with a save/delete/reload lifecycle.
pub trait Record {
    /// Address of the collection this record lives in.
    fn collection_address() -> Address;

    /// Current identity; `0` means not yet persisted.
    fn identity(&self) -> i64;

    /// Replaces the identity (called by `save` after an insert).
    fn set_identity(&mut self, identity: i64);

    /// Clears the implementor's dirty flag.
    fn mark_clean(&mut self);

    /// Writes the entity's columns into `values` for insert/update.
    fn fill(&self, values: &mut ValueSet);

    /// Overwrites the entity's attributes from a stored row.
    fn hydrate(&mut self, row: &StoredRow) -> StoreResult<()>;

    /// Address of this record's own row.
    fn row_address(&self) -> Address {
        Self::collection_address().joined(self.identity())
    }

    /// Inserts or updates depending on identity state.
    fn save(&mut self, router: &ResourceRouter) -> StoreResult<()> {
        let mut values = router.values()?;
        self.fill(&mut values);
        if self.identity() == 0 {
            let identity = values.insert(router, &Self::collection_address())?;
            self.set_identity(identity);
        } else {
            values.update_by_identity(router, &Self::collection_address(), self.identity())?;
        }
        self.mark_clean();
        Ok(())
    }

    /// Removes the row at the current identity, returning the removed-row
    /// count. Rejects unpersisted records.
    fn delete(&mut self, router: &ResourceRouter) -> StoreResult<usize> {
        if self.identity() == 0 {
            return Err(StoreError::NotPersisted);
        }
        let removed = router.delete(&self.row_address(), None)?;
        self.mark_clean();
        Ok(removed)
    }

    /// Re-reads the row at the current identity and overwrites the
    /// in-memory attributes. No-op on unpersisted records.
    fn reload(&mut self, router: &ResourceRouter) -> StoreResult<()> {
        if self.identity() == 0 {
            return Ok(());
        }
        let rows = router.query(&self.row_address(), None, None, None)?;
        if let Some(row) = rows.first() {
            self.hydrate(row)?;
        }
        self.mark_clean();
        Ok(())
    }
}
