//! Buddy Arena Allocator
//!
//! This crate manages a fixed-size contiguous memory arena with the binary
//! buddy algorithm:
//! - Requests are rounded up to a power-of-two block size
//! - Allocation splits larger free blocks down to the requested order
//! - Deallocation recursively merges a block with its address-adjacent buddy
//!
//! The arena covers `2^max_order` bytes starting at a caller-provided base
//! address and is divided into pages of `2^min_order` bytes. Both orders are
//! construction parameters; [`DEFAULT_MIN_ORDER`] and [`DEFAULT_MAX_ORDER`]
//! give the conventional 4 KiB page / 1 MiB arena geometry.

#![no_std]

extern crate alloc;

// Logging support - conditionally import log crate
#[cfg(feature = "log")]
extern crate log;

// Stub macros when log is disabled - these become no-ops
#[cfg(not(feature = "log"))]
macro_rules! error {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

/// Default page size exponent (4096-byte pages).
pub const DEFAULT_MIN_ORDER: u32 = 12;

/// Default arena size exponent (1 MiB arena).
pub const DEFAULT_MAX_ORDER: u32 = 20;

/// The error type used for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Bad arena geometry or unaligned base address at construction.
    InvalidParam,
    /// Requested size is zero or exceeds the arena capacity.
    InvalidSize,
    /// No free block at or above the required order.
    NoMemory,
    /// Address does not name a currently-allocated block head.
    InvalidFree,
}

/// A [`Result`] type with [`AllocError`] as the error type.
pub type AllocResult<T = ()> = Result<T, AllocError>;

/// Checks whether the address has the demanded alignment.
///
/// Equivalent to `addr % align == 0`, but the alignment must be a power of two.
#[inline]
pub(crate) const fn is_aligned(addr: usize, align: usize) -> bool {
    addr & (align - 1) == 0
}

pub mod buddy;
pub use buddy::order::order_for;
pub use buddy::{ArenaStats, BuddyArena, FreeReport};

pub mod locked;
pub use locked::LockedArena;
