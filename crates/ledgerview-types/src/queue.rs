//! Read-only view over a fixed-capacity circular queue embedded in an account.
//!
//! The ledger program owns the queue and is its only mutator: a single
//! consumer dequeues from the front, producers enqueue at the back. A
//! decoded [`RingBufferQueue`] is an immutable snapshot of that state.
//!
//! Layout: `front: u32`, `len: u32`, then the backing array as a `Vec<T>`
//! whose length is the queue capacity. Logical item `i` lives at physical
//! index `(front + i) % capacity`.

use std::iter::FusedIterator;

use serde::Serialize;

use crate::layout::{LayoutReader, LayoutWriter, ReadLayout, WriteLayout};
use crate::{LedgerviewError, Result};

/// Snapshot of a bounded circular queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingBufferQueue<T> {
    /// Backing array; its length is the capacity.
    items: Vec<T>,
    /// Physical index of the oldest item.
    front: usize,
    /// Number of live items.
    len: usize,
}

impl<T> RingBufferQueue<T> {
    /// Build a snapshot, checking `capacity > 0`, `front < capacity` and
    /// `len <= capacity`.
    pub fn new(items: Vec<T>, front: usize, len: usize) -> Result<Self> {
        let capacity = items.len();
        if capacity == 0 {
            return Err(LedgerviewError::InvalidQueueLayout {
                reason: "capacity must be positive".to_string(),
            });
        }
        if front >= capacity {
            return Err(LedgerviewError::InvalidQueueLayout {
                reason: format!("front {front} outside capacity {capacity}"),
            });
        }
        if len > capacity {
            return Err(LedgerviewError::InvalidQueueLayout {
                reason: format!("len {len} exceeds capacity {capacity}"),
            });
        }
        Ok(Self { items, front, len })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Physical index of the oldest item. Meaningless for an empty queue
    /// beyond locating the next write slot.
    #[must_use]
    pub fn front_index(&self) -> usize {
        self.front
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Slots the producer can still fill before the queue applies backpressure.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.len
    }

    /// Physical index the next enqueue would write to.
    #[must_use]
    pub fn next_write_index(&self) -> usize {
        (self.front + self.len) % self.capacity()
    }

    /// Physical index of logical position `i`, or `None` past the end.
    #[must_use]
    pub fn physical_index(&self, i: usize) -> Option<usize> {
        (i < self.len).then(|| (self.front + i) % self.capacity())
    }

    /// Logical item `i`, counting from the oldest.
    pub fn get(&self, i: usize) -> Result<&T> {
        self.physical_index(i)
            .map(|idx| &self.items[idx])
            .ok_or(LedgerviewError::QueueIndexOutOfBounds {
                index: i,
                len: self.len,
            })
    }

    /// Oldest item: the next one the consumer will dequeue.
    #[must_use]
    pub fn peek_front(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Newest item.
    #[must_use]
    pub fn peek_back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last).ok())
    }

    /// Items oldest to newest.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            queue: self,
            head: 0,
            tail: self.len,
        }
    }

    /// Physical indices visited by [`iter`](Self::iter), in order.
    pub fn physical_indices(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        let capacity = self.capacity();
        (0..self.len).map(move |i| (self.front + i) % capacity)
    }

    /// The raw backing array, in physical order, including stale slots.
    #[must_use]
    pub fn backing(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> RingBufferQueue<T> {
    /// Clone the live items into a `Vec`, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a RingBufferQueue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Oldest-first iterator over a [`RingBufferQueue`].
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    queue: &'a RingBufferQueue<T>,
    head: usize,
    tail: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.head == self.tail {
            return None;
        }
        let item = self.queue.get(self.head).ok();
        self.head += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.tail - self.head;
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        self.queue.get(self.tail).ok()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: ReadLayout> ReadLayout for RingBufferQueue<T> {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        let front = reader.read::<u32>()? as usize;
        let len = reader.read::<u32>()? as usize;
        let items = reader.read::<Vec<T>>()?;
        Self::new(items, front, len)
    }
}

impl<T: WriteLayout> WriteLayout for RingBufferQueue<T> {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.write_len(self.front);
        writer.write_len(self.len);
        writer.write(&self.items);
    }
}
