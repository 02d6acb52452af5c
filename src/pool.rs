//! Bounded object pools for builder reuse.
//!
//! Query expressions and value sets are drawn from and returned to pools
//! around each routed operation to bound allocation churn. The pool is a
//! plain free-list behind a mutex, sized once at construction; acquisition
//! either fails fast or blocks on a condvar depending on the configured
//! [`AcquireMode`]. A checked-out object travels inside a [`Pooled`] guard
//! that resets and returns it on drop.
//!
//! Concurrent borrow/return from multiple threads is supported; concurrent
//! use of a single checked-out instance is not, matching the single-writer
//! contract of the builders themselves.

use crate::config::AcquireMode;
use crate::error::{StoreError, StoreResult};
use parking_lot::{Condvar, Mutex};
use std::ops::{Deref, DerefMut};

/// Implemented by types that can be stored in a [`Pool`].
///
/// `reset` must return the object to its freshly-constructed state; it runs
/// on every release before the slot becomes available again.
pub trait Reusable: Default {
    fn reset(&mut self);
}

/// Bounded concurrent free-list of reusable objects.
pub struct Pool<T: Reusable> {
    slots: Mutex<Vec<T>>,
    available: Condvar,
    capacity: usize,
    mode: AcquireMode,
}

impl<T: Reusable> Pool<T> {
    /// Creates a pool pre-filled with `capacity` default-constructed objects.
    pub fn new(capacity: usize, mode: AcquireMode) -> Self {
        let slots = (0..capacity).map(|_| T::default()).collect();
        Self {
            slots: Mutex::new(slots),
            available: Condvar::new(),
            capacity,
            mode,
        }
    }

    /// Checks an object out of the pool.
    ///
    /// In [`AcquireMode::FailFast`] an empty pool yields
    /// [`StoreError::PoolExhausted`]; in [`AcquireMode::Block`] the call
    /// waits until a slot is released.
    pub fn acquire(&self) -> StoreResult<Pooled<'_, T>> {
        let mut slots = self.slots.lock();
        loop {
            if let Some(item) = slots.pop() {
                return Ok(Pooled { pool: self, item: Some(item) });
            }
            match self.mode {
                AcquireMode::FailFast => {
                    return Err(StoreError::PoolExhausted { capacity: self.capacity });
                }
                AcquireMode::Block => self.available.wait(&mut slots),
            }
        }
    }

    /// Total number of slots the pool was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently available for checkout.
    pub fn available(&self) -> usize {
        self.slots.lock().len()
    }

    fn release(&self, mut item: T) {
        item.reset();
        self.slots.lock().push(item);
        self.available.notify_one();
    }
}

/// Guard over a checked-out pool object.
///
/// Dereferences to the pooled value; dropping the guard resets the object
/// and returns it to the pool.
pub struct Pooled<'p, T: Reusable> {
    pool: &'p Pool<T>,
    item: Option<T>,
}

impl<T: Reusable> std::fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pooled").finish_non_exhaustive()
    }
}

impl<T: Reusable> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().expect("pooled item present until drop")
    }
}

impl<T: Reusable> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect("pooled item present until drop")
    }
}

impl<T: Reusable> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
