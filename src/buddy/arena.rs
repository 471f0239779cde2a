//! Fixed-size buddy arena
//!
//! Implements the core buddy system for a single contiguous region: the
//! allocator splits larger free blocks down to the requested order and the
//! deallocator merges released blocks with their buddies back up. All state
//! lives in the page table and the per-order free lists; arena memory itself
//! is never touched, so the arena works equally for virtual and physical
//! address ranges.

use alloc::vec::Vec;

use crate::{is_aligned, AllocError, AllocResult};

#[cfg(feature = "log")]
use log::{debug, error};

use super::{
    free_list::FreeList,
    order::order_for,
    page_table::{PageState, PageTable},
    stats::{ArenaStats, FreeReport},
};

/// A buddy allocator over one fixed contiguous region.
///
/// The region spans `2^max_order` bytes starting at `base_addr` and is
/// divided into pages of `2^min_order` bytes. The arena owns the region for
/// its lifetime; it is created as one free block of `max_order` and never
/// resized.
#[derive(Debug)]
pub struct BuddyArena {
    base_addr: usize,
    min_order: u32,
    max_order: u32,
    pages: PageTable,
    /// Free lists indexed by `order - min_order`.
    free_lists: Vec<FreeList>,
    allocated_bytes: usize,
}

impl BuddyArena {
    /// Create an arena of `2^max_order` bytes at `base_addr` with pages of
    /// `2^min_order` bytes.
    ///
    /// `base_addr` must be page-aligned and the region must fit in the
    /// address space. The whole arena starts as a single free block at
    /// `max_order`.
    pub fn new(base_addr: usize, min_order: u32, max_order: u32) -> AllocResult<Self> {
        if min_order > max_order || max_order >= usize::BITS {
            error!(
                "buddy arena: invalid geometry: min_order {} max_order {}",
                min_order, max_order
            );
            return Err(AllocError::InvalidParam);
        }
        if !is_aligned(base_addr, 1usize << min_order) {
            error!(
                "buddy arena: base address {:#x} not aligned to page size {:#x}",
                base_addr,
                1usize << min_order
            );
            return Err(AllocError::InvalidParam);
        }
        if base_addr.checked_add(1usize << max_order).is_none() {
            error!(
                "buddy arena: region [{:#x}, +{:#x}) wraps the address space",
                base_addr,
                1usize << max_order
            );
            return Err(AllocError::InvalidParam);
        }

        let page_count = 1usize << (max_order - min_order);
        let order_count = (max_order - min_order + 1) as usize;

        let mut free_lists = Vec::with_capacity(order_count);
        free_lists.resize_with(order_count, FreeList::new);

        let mut arena = Self {
            base_addr,
            min_order,
            max_order,
            pages: PageTable::new(page_count),
            free_lists,
            allocated_bytes: 0,
        };
        arena.install_initial_block();
        Ok(arena)
    }

    /// Discard all allocation state and return to a pristine arena.
    ///
    /// Every outstanding address becomes invalid; callers must only reset
    /// when an intentional wipe is desired.
    pub fn reset(&mut self) {
        for list in &mut self.free_lists {
            list.clear();
        }
        self.pages.reset();
        self.allocated_bytes = 0;
        self.install_initial_block();
    }

    /// Register page 0 as the single free block covering the whole arena.
    fn install_initial_block(&mut self) {
        let top = self.list_index(self.max_order);
        self.pages.set_state(
            0,
            PageState::FreeHead {
                order: self.max_order,
            },
        );
        self.free_lists[top].push_front(&mut self.pages, 0);
    }

    /// Allocate a block of at least `size` bytes.
    ///
    /// Scans orders from the required one upward and takes the first
    /// non-empty free list (ascending best-fit), splitting the block down
    /// iteratively: at each step the lower half continues and the upper half
    /// becomes a new free-list head one order below.
    pub fn allocate(&mut self, size: usize) -> AllocResult<usize> {
        let target = order_for(size, self.min_order, self.max_order)?;

        let found = (target..=self.max_order)
            .find(|&order| !self.free_lists[self.list_index(order)].is_empty());
        let Some(found) = found else {
            debug!(
                "buddy arena: out of memory: {} bytes (order {})",
                size, target
            );
            return Err(AllocError::NoMemory);
        };

        let list = self.list_index(found);
        let index = self.free_lists[list]
            .pop_front(&mut self.pages)
            .ok_or(AllocError::NoMemory)?;

        // Split down to the target order. The lower half stays, the upper
        // half goes to the free list one order below the current step.
        let mut order = found;
        while order > target {
            order -= 1;
            let upper = index + self.pages_per_block(order);
            self.pages.set_state(upper, PageState::FreeHead { order });
            let list = self.list_index(order);
            self.free_lists[list].push_front(&mut self.pages, upper);
        }

        self.pages
            .set_state(index, PageState::AllocatedHead { order: target });
        self.allocated_bytes += 1usize << target;
        Ok(self.addr_of(index))
    }

    /// Free a block previously returned by [`allocate`](Self::allocate).
    ///
    /// The buddy of the released block is tested directly through its page
    /// record; while the buddy is a free head of the same order, the two are
    /// merged (the lower index becomes the head) and the cascade continues
    /// one order up.
    ///
    /// Fails with [`AllocError::InvalidFree`], leaving all state untouched,
    /// if `addr` is not the head of a currently-allocated block. This covers
    /// double frees, interior addresses, and addresses outside the arena.
    pub fn free(&mut self, addr: usize) -> AllocResult {
        if !self.contains(addr) || !is_aligned(addr, 1usize << self.min_order) {
            error!("buddy arena: invalid free of {:#x}: not a page in the arena", addr);
            return Err(AllocError::InvalidFree);
        }

        let mut index = self.index_of(addr);
        let mut order = match self.pages.state(index) {
            PageState::AllocatedHead { order } => order,
            _ => {
                error!(
                    "buddy arena: invalid free of {:#x}: not an allocated block head",
                    addr
                );
                return Err(AllocError::InvalidFree);
            }
        };

        self.allocated_bytes -= 1usize << order;
        self.pages.set_state(index, PageState::Body);

        // Merge cascade: stop at the first buddy that is not a free head of
        // the same order, or when the whole arena is reconstituted.
        while order < self.max_order {
            let buddy = index ^ self.pages_per_block(order);
            if self.pages.state(buddy) != (PageState::FreeHead { order }) {
                break;
            }
            let list = self.list_index(order);
            self.free_lists[list].unlink(&mut self.pages, buddy);
            self.pages.set_state(buddy, PageState::Body);
            index = index.min(buddy);
            order += 1;
        }

        self.pages.set_state(index, PageState::FreeHead { order });
        let list = self.list_index(order);
        self.free_lists[list].push_front(&mut self.pages, index);
        Ok(())
    }

    /// Per-order free-block counts, ascending. Read-only.
    pub fn free_report(&self) -> FreeReport {
        let counts = (self.min_order..=self.max_order)
            .map(|order| (order, self.free_lists[self.list_index(order)].len()))
            .collect();
        FreeReport::new(counts)
    }

    /// Occupancy snapshot. Read-only.
    pub fn stats(&self) -> ArenaStats {
        let free_bytes = (self.min_order..=self.max_order)
            .map(|order| self.free_lists[self.list_index(order)].len() << order)
            .sum();
        ArenaStats {
            total_bytes: self.total_bytes(),
            allocated_bytes: self.allocated_bytes,
            free_bytes,
        }
    }

    /// Arena capacity in bytes.
    pub fn total_bytes(&self) -> usize {
        1usize << self.max_order
    }

    /// Bytes currently handed out, counted at block granularity.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes
    }

    pub fn base_addr(&self) -> usize {
        self.base_addr
    }

    pub fn min_order(&self) -> u32 {
        self.min_order
    }

    pub fn max_order(&self) -> u32 {
        self.max_order
    }

    /// Check if an address falls inside the arena.
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.base_addr && addr - self.base_addr < self.total_bytes()
    }

    #[inline]
    fn list_index(&self, order: u32) -> usize {
        (order - self.min_order) as usize
    }

    /// Number of pages in a block of the given order.
    #[inline]
    fn pages_per_block(&self, order: u32) -> usize {
        1usize << (order - self.min_order)
    }

    #[inline]
    fn addr_of(&self, index: usize) -> usize {
        self.base_addr + (index << self.min_order)
    }

    #[inline]
    fn index_of(&self, addr: usize) -> usize {
        (addr - self.base_addr) >> self.min_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The arena never dereferences its addresses, so a synthetic base is
    // enough for unit tests.
    const TEST_BASE: usize = 0x4000_0000;

    fn test_arena() -> BuddyArena {
        BuddyArena::new(TEST_BASE, 12, 20).unwrap()
    }

    #[test]
    fn test_geometry_validation() {
        assert_eq!(
            BuddyArena::new(TEST_BASE, 20, 12).unwrap_err(),
            AllocError::InvalidParam
        );
        assert_eq!(
            BuddyArena::new(TEST_BASE + 1, 12, 20).unwrap_err(),
            AllocError::InvalidParam
        );
        assert_eq!(
            BuddyArena::new(TEST_BASE, 12, usize::BITS).unwrap_err(),
            AllocError::InvalidParam
        );
    }

    #[test]
    fn test_pristine_arena_is_one_block() {
        let arena = test_arena();
        let report = arena.free_report();
        assert_eq!(report.count_at(20), 1);
        for order in 12..20 {
            assert_eq!(report.count_at(order), 0);
        }
        assert_eq!(arena.stats().free_bytes, 1 << 20);
    }

    #[test]
    fn test_allocate_splits_down() {
        let mut arena = test_arena();
        let addr = arena.allocate(1).unwrap();
        assert_eq!(addr, TEST_BASE);

        // Each split step leaves the upper half free one order below, so
        // every order from the allocated one to max_order - 1 holds exactly
        // one free block.
        let report = arena.free_report();
        for order in 12..20 {
            assert_eq!(report.count_at(order), 1);
        }
        assert_eq!(report.count_at(20), 0);
        assert!(arena.stats().is_conserved());
    }

    #[test]
    fn test_free_merges_back() {
        let mut arena = test_arena();
        let addr = arena.allocate(1).unwrap();
        arena.free(addr).unwrap();

        let report = arena.free_report();
        assert_eq!(report.count_at(20), 1);
        for order in 12..20 {
            assert_eq!(report.count_at(order), 0);
        }
    }

    #[test]
    fn test_invalid_free_detected() {
        let mut arena = test_arena();
        let addr = arena.allocate(4096).unwrap();

        // Outside the arena
        assert_eq!(arena.free(TEST_BASE - 4096), Err(AllocError::InvalidFree));
        // Unaligned
        assert_eq!(arena.free(addr + 1), Err(AllocError::InvalidFree));
        // Never allocated
        assert_eq!(arena.free(addr + 4096), Err(AllocError::InvalidFree));

        arena.free(addr).unwrap();
        // Double free
        assert_eq!(arena.free(addr), Err(AllocError::InvalidFree));
    }

    #[test]
    fn test_interior_address_is_invalid_free() {
        let mut arena = test_arena();
        let addr = arena.allocate(8192).unwrap();
        // Page-aligned but in the middle of the block
        assert_eq!(arena.free(addr + 4096), Err(AllocError::InvalidFree));
        arena.free(addr).unwrap();
    }

    #[test]
    fn test_reset_discards_state() {
        let mut arena = test_arena();
        let _ = arena.allocate(4096).unwrap();
        let _ = arena.allocate(32768).unwrap();
        arena.reset();

        assert_eq!(arena.allocated_bytes(), 0);
        let report = arena.free_report();
        assert_eq!(report.count_at(20), 1);
        assert_eq!(arena.allocate(1 << 20).unwrap(), TEST_BASE);
    }

    #[test]
    fn test_stats_conservation() {
        let mut arena = test_arena();
        assert!(arena.stats().is_conserved());
        let a = arena.allocate(5000).unwrap();
        let b = arena.allocate(120_000).unwrap();
        assert!(arena.stats().is_conserved());
        arena.free(a).unwrap();
        assert!(arena.stats().is_conserved());
        arena.free(b).unwrap();
        assert!(arena.stats().is_conserved());
        assert_eq!(arena.stats().free_bytes, 1 << 20);
    }
}
