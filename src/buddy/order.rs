//! Order calculation
//!
//! Maps a byte-size request to the minimal power-of-two order that
//! satisfies it.

use crate::{AllocError, AllocResult};

/// Returns the smallest order `o` in `[min_order, max_order]` with
/// `2^o >= size`.
///
/// Fails with [`AllocError::InvalidSize`] if `size` is zero or no order up
/// to `max_order` can satisfy it. Pure function, no side effects.
pub fn order_for(size: usize, min_order: u32, max_order: u32) -> AllocResult<u32> {
    if size == 0 || size > 1usize << max_order {
        return Err(AllocError::InvalidSize);
    }
    let order = size.next_power_of_two().trailing_zeros();
    Ok(order.max(min_order))
}
