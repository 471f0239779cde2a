//! Spin-locked arena wrapper
//!
//! The core [`BuddyArena`] is single-owner by design. For concurrent
//! callers, this wrapper guards the whole page table and free-list registry
//! behind one coarse-grained spin lock; both the split and merge cascades
//! run entirely under it, so no lock-order concerns arise.

use spin::Mutex;

use crate::buddy::{ArenaStats, BuddyArena, FreeReport};
use crate::AllocResult;

/// A [`BuddyArena`] shareable across threads behind a single spin lock.
pub struct LockedArena {
    inner: Mutex<BuddyArena>,
}

impl LockedArena {
    /// Create a locked arena; see [`BuddyArena::new`] for the geometry rules.
    pub fn new(base_addr: usize, min_order: u32, max_order: u32) -> AllocResult<Self> {
        Ok(Self {
            inner: Mutex::new(BuddyArena::new(base_addr, min_order, max_order)?),
        })
    }

    /// Allocate a block of at least `size` bytes.
    pub fn allocate(&self, size: usize) -> AllocResult<usize> {
        self.inner.lock().allocate(size)
    }

    /// Free a block previously returned by [`allocate`](Self::allocate).
    pub fn free(&self, addr: usize) -> AllocResult {
        self.inner.lock().free(addr)
    }

    /// Discard all allocation state and return to a pristine arena.
    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Per-order free-block counts, ascending.
    pub fn free_report(&self) -> FreeReport {
        self.inner.lock().free_report()
    }

    /// Occupancy snapshot.
    pub fn stats(&self) -> ArenaStats {
        self.inner.lock().stats()
    }
}
