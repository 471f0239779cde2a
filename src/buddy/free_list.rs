//! Intrusive per-order free list
//!
//! Maintains only the list structure (head/tail/len); the links live inside
//! the page records, so the page table acts as the node pool. Page indices
//! never leave the table, which keeps unlink O(1): the buddy of a block is
//! found by index arithmetic and removed through its own record's links,
//! never by scanning the list.

use super::page_table::PageTable;

/// A free list of page indices for one order.
#[derive(Debug)]
pub struct FreeList {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl FreeList {
    /// Create a new empty free list.
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the length of the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Push a page index at the front of the list.
    ///
    /// The caller is responsible for the page's state field; this only
    /// maintains the links.
    pub fn push_front(&mut self, table: &mut PageTable, index: usize) {
        table.set_links(index, None, self.head);
        if let Some(old_head) = self.head {
            table.set_prev(old_head, Some(index));
        } else {
            self.tail = Some(index);
        }
        self.head = Some(index);
        self.len += 1;
    }

    /// Pop the first page index from the list.
    pub fn pop_front(&mut self, table: &mut PageTable) -> Option<usize> {
        let head = self.head?;
        self.head = table.next(head);
        if let Some(new_head) = self.head {
            table.set_prev(new_head, None);
        } else {
            self.tail = None;
        }
        table.set_links(head, None, None);
        self.len -= 1;
        Some(head)
    }

    /// Unlink a page index from anywhere in the list in O(1).
    ///
    /// The index must currently be a member of this list.
    pub fn unlink(&mut self, table: &mut PageTable, index: usize) {
        let prev = table.prev(index);
        let next = table.next(index);

        match prev {
            Some(p) => table.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => table.set_prev(n, prev),
            None => self.tail = prev,
        }

        table.set_links(index, None, None);
        self.len -= 1;
    }

    /// Drop all membership without touching the records.
    ///
    /// Used only when the whole table is about to be reset.
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Get iterator over page indices, front to back.
    pub fn iter<'a>(&'a self, table: &'a PageTable) -> FreeListIter<'a> {
        FreeListIter {
            table,
            current: self.head,
        }
    }
}

impl Default for FreeList {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator for [`FreeList`].
pub struct FreeListIter<'a> {
    table: &'a PageTable,
    current: Option<usize>,
}

impl<'a> Iterator for FreeListIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        self.current = self.table.next(index);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PAGE_COUNT: usize = 64;

    #[test]
    fn test_push_pop_front() {
        let mut table = PageTable::new(TEST_PAGE_COUNT);
        let mut list = FreeList::new();

        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        list.push_front(&mut table, 3);
        list.push_front(&mut table, 7);
        list.push_front(&mut table, 11);
        assert_eq!(list.len(), 3);

        // LIFO: last pushed comes out first
        assert_eq!(list.pop_front(&mut table), Some(11));
        assert_eq!(list.pop_front(&mut table), Some(7));
        assert_eq!(list.pop_front(&mut table), Some(3));
        assert_eq!(list.pop_front(&mut table), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_unlink_middle_head_tail() {
        let mut table = PageTable::new(TEST_PAGE_COUNT);
        let mut list = FreeList::new();

        for index in [1, 2, 3, 4] {
            list.push_front(&mut table, index);
        }
        // List is now 4, 3, 2, 1

        list.unlink(&mut table, 3);
        let items: alloc::vec::Vec<_> = list.iter(&table).collect();
        assert_eq!(items, [4, 2, 1]);

        list.unlink(&mut table, 4);
        let items: alloc::vec::Vec<_> = list.iter(&table).collect();
        assert_eq!(items, [2, 1]);

        list.unlink(&mut table, 1);
        let items: alloc::vec::Vec<_> = list.iter(&table).collect();
        assert_eq!(items, [2]);

        list.unlink(&mut table, 2);
        assert!(list.is_empty());
        assert_eq!(list.iter(&table).count(), 0);
    }

    #[test]
    fn test_unlink_then_reuse() {
        let mut table = PageTable::new(TEST_PAGE_COUNT);
        let mut list = FreeList::new();

        list.push_front(&mut table, 5);
        list.push_front(&mut table, 6);
        list.unlink(&mut table, 5);
        list.push_front(&mut table, 5);

        let items: alloc::vec::Vec<_> = list.iter(&table).collect();
        assert_eq!(items, [5, 6]);
    }
}
