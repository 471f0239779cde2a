//! Buddy arena module
//!
//! This module provides the complete buddy system implementation:
//! - Per-page metadata table doubling as the free-list node pool
//! - Intrusive per-order free lists with O(1) unlink
//! - Iterative split and merge cascades
//! - Read-only free-block reporting

pub mod arena;
pub mod free_list;
pub mod order;
pub mod page_table;
pub mod stats;

pub use arena::BuddyArena;
pub use free_list::FreeList;
pub use page_table::{PageRecord, PageState, PageTable};
pub use stats::{ArenaStats, FreeReport};
