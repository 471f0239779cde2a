//! Per-page metadata table
//!
//! One [`PageRecord`] per minimum-size unit of the arena. The table is built
//! once at initialization and records only change role afterwards: a page is
//! either the head of a block (free or allocated, at some order) or the body
//! of a larger block. The records also carry the intrusive links used by the
//! per-order free lists, so the table doubles as the list node pool.

use alloc::boxed::Box;
use alloc::vec;

/// Role of a page within the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Non-head member of a larger block.
    Body,
    /// Head of a free block of the given order, linked into that order's
    /// free list.
    FreeHead { order: u32 },
    /// Head of an allocated block of the given order.
    AllocatedHead { order: u32 },
}

/// Per-page metadata.
///
/// `prev`/`next` are page indices and are meaningful only while the page is
/// a [`PageState::FreeHead`].
#[derive(Debug, Clone, Copy)]
pub struct PageRecord {
    pub state: PageState,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl PageRecord {
    pub const fn body() -> Self {
        Self {
            state: PageState::Body,
            prev: None,
            next: None,
        }
    }
}

/// The page table: one record per page, indexed by page number.
#[derive(Debug)]
pub struct PageTable {
    records: Box<[PageRecord]>,
}

impl PageTable {
    /// Create a table of `page_count` body records.
    pub fn new(page_count: usize) -> Self {
        Self {
            records: vec![PageRecord::body(); page_count].into_boxed_slice(),
        }
    }

    /// Reset every record to body state, discarding all block structure.
    pub fn reset(&mut self) {
        for record in self.records.iter_mut() {
            *record = PageRecord::body();
        }
    }

    pub fn state(&self, index: usize) -> PageState {
        self.records[index].state
    }

    pub fn set_state(&mut self, index: usize, state: PageState) {
        self.records[index].state = state;
    }

    pub fn prev(&self, index: usize) -> Option<usize> {
        self.records[index].prev
    }

    pub fn next(&self, index: usize) -> Option<usize> {
        self.records[index].next
    }

    pub fn set_links(&mut self, index: usize, prev: Option<usize>, next: Option<usize>) {
        self.records[index].prev = prev;
        self.records[index].next = next;
    }

    pub fn set_prev(&mut self, index: usize, prev: Option<usize>) {
        self.records[index].prev = prev;
    }

    pub fn set_next(&mut self, index: usize, next: Option<usize>) {
        self.records[index].next = next;
    }
}
