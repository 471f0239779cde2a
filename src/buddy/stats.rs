//! Statistics and reporting for the buddy arena
//!
//! Read-only snapshots of free-list occupancy. Safe to take at any time;
//! neither type holds a reference into the arena.

use alloc::vec::Vec;
use core::fmt;

/// Per-order free-block counts, ascending by order.
///
/// Renders as fixed-width text in the classic buddy dump format: one
/// `"<count>:<KiB>K "` entry per order, space-separated, newline-terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeReport {
    counts: Vec<(u32, usize)>,
}

impl FreeReport {
    pub(crate) fn new(counts: Vec<(u32, usize)>) -> Self {
        Self { counts }
    }

    /// `(order, free block count)` pairs, ascending by order.
    pub fn counts(&self) -> &[(u32, usize)] {
        &self.counts
    }

    /// Number of free blocks at the given order, zero if out of range.
    pub fn count_at(&self, order: u32) -> usize {
        self.counts
            .iter()
            .find(|(o, _)| *o == order)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

impl fmt::Display for FreeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (order, count) in &self.counts {
            write!(f, "{}:{}K ", count, (1usize << order) / 1024)?;
        }
        writeln!(f)
    }
}

/// Arena occupancy statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Arena capacity in bytes.
    pub total_bytes: usize,
    /// Bytes currently handed out, counted at block granularity.
    pub allocated_bytes: usize,
    /// Bytes currently sitting in free lists.
    pub free_bytes: usize,
}

impl ArenaStats {
    /// Conservation check: every byte is either allocated or free.
    pub fn is_conserved(&self) -> bool {
        self.allocated_bytes + self.free_bytes == self.total_bytes
    }
}
