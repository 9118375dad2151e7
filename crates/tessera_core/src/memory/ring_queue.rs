//! # Ring Queue
//!
//! Fixed-capacity circular FIFO of `Copy` records, allocated once.
//!
//! Besides plain enqueue/dequeue it can take a [`QueueCheckpoint`] of its
//! cursors and later rewind to it. Everything enqueued after the checkpoint's
//! read position is still in the buffer, so rewinding replays that range
//! again without anyone re-enqueueing it. The light engine uses this to run
//! several relaxation passes over one working set.
//!
//! ## Overflow
//!
//! Overflow is a caller bug, not a runtime condition: the buffer must be sized
//! for the worst case up front. Enqueueing into a full queue panics.

/// Saved `(read, write)` cursor pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueCheckpoint {
    read: usize,
    write: usize,
}

/// Circular buffer of fixed-size records.
///
/// One slot always stays free to tell "full" from "empty", so a queue built
/// with `capacity` slots holds at most `capacity - 1` records.
///
/// # Example
///
/// ```rust,ignore
/// let mut queue = RingQueue::new(16);
/// queue.enqueue(1u32);
/// queue.freeze();
/// queue.enqueue(2);
/// assert_eq!(queue.dequeue(), Some(1));
/// queue.thaw();                       // back to before `1` was read
/// assert_eq!(queue.dequeue(), Some(1));
/// ```
#[derive(Clone, Debug)]
pub struct RingQueue<T: Copy> {
    slots: Box<[T]>,
    read: usize,
    write: usize,
    frozen: Option<QueueCheckpoint>,
}

impl<T: Copy + Default> RingQueue<T> {
    /// Creates a queue with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 1, "ring queue needs at least 2 slots, got {capacity}");
        Self {
            slots: vec![T::default(); capacity].into_boxed_slice(),
            read: 0,
            write: 0,
            frozen: None,
        }
    }
}

impl<T: Copy> RingQueue<T> {
    /// Total slots, including the one kept free.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of records waiting to be dequeued.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        if self.write >= self.read {
            self.write - self.read
        } else {
            self.slots.len() - self.read + self.write
        }
    }

    /// Returns true if nothing is waiting.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Resets both cursors to the start of the buffer.
    pub fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
        self.frozen = None;
    }

    /// Appends a record.
    ///
    /// # Panics
    ///
    /// Panics if the queue is full (the write cursor would catch up with the
    /// read cursor).
    #[inline]
    pub fn enqueue(&mut self, record: T) {
        self.slots[self.write] = record;
        self.write += 1;
        if self.write == self.slots.len() {
            self.write = 0;
        }
        assert!(
            self.write != self.read,
            "ring queue overflow: capacity {} exhausted",
            self.slots.len()
        );
    }

    /// Removes and returns the oldest record.
    #[inline]
    pub fn dequeue(&mut self) -> Option<T> {
        if self.read == self.write {
            return None;
        }
        let record = self.slots[self.read];
        self.read += 1;
        if self.read == self.slots.len() {
            self.read = 0;
        }
        Some(record)
    }

    /// Snapshot of the current cursors.
    #[inline]
    #[must_use]
    pub fn checkpoint(&self) -> QueueCheckpoint {
        QueueCheckpoint {
            read: self.read,
            write: self.write,
        }
    }

    /// Restores cursors from a checkpoint.
    ///
    /// Records between the checkpoint's read and write cursors become
    /// pending again.
    #[inline]
    pub fn rewind(&mut self, checkpoint: QueueCheckpoint) {
        self.read = checkpoint.read;
        self.write = checkpoint.write;
    }

    /// Stores a checkpoint inside the queue for a later [`thaw`](Self::thaw).
    pub fn freeze(&mut self) {
        self.frozen = Some(self.checkpoint());
    }

    /// Rewinds to the checkpoint stored by [`freeze`](Self::freeze).
    ///
    /// Without a stored checkpoint this rewinds to the start of the buffer,
    /// matching a freeze right after `clear`.
    pub fn thaw(&mut self) {
        let checkpoint = self.frozen.unwrap_or(QueueCheckpoint { read: 0, write: 0 });
        self.rewind(checkpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = RingQueue::new(8);
        for i in 0..7u32 {
            queue.enqueue(i);
        }
        assert_eq!(queue.len(), 7);
        let drained: Vec<u32> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(drained, (0..7).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wraparound_keeps_order() {
        let mut queue = RingQueue::new(4);
        let mut expected = 0u32;
        for i in 0..100u32 {
            queue.enqueue(i);
            if i % 2 == 1 {
                assert_eq!(queue.dequeue(), Some(expected));
                expected += 1;
                assert_eq!(queue.dequeue(), Some(expected));
                expected += 1;
            }
        }
        assert!(queue.is_empty());
    }

    #[test]
    #[should_panic(expected = "ring queue overflow")]
    fn test_overflow_panics() {
        let mut queue = RingQueue::new(4);
        for i in 0..4u8 {
            queue.enqueue(i);
        }
    }

    #[test]
    fn test_freeze_thaw_replays_range() {
        let mut queue = RingQueue::new(16);
        queue.enqueue(10u16);
        queue.enqueue(11);
        queue.freeze();
        queue.enqueue(12);

        let first: Vec<u16> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(first, vec![10, 11, 12]);

        // Thaw restores the frozen cursors: the replay set is what was
        // pending at freeze time.
        queue.thaw();
        let replay: Vec<u16> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(replay, vec![10, 11]);

        queue.thaw();
        assert_eq!(queue.dequeue(), Some(10));
    }

    #[test]
    fn test_checkpoint_rewind_multiple_passes() {
        let mut queue = RingQueue::new(32);
        for i in 0..20u32 {
            queue.enqueue(i);
        }
        let checkpoint = queue.checkpoint();
        for _ in 0..3 {
            queue.rewind(checkpoint);
            let sum: u32 = std::iter::from_fn(|| queue.dequeue()).sum();
            assert_eq!(sum, (0..20).sum::<u32>());
        }
    }

    #[test]
    fn test_clear_resets() {
        let mut queue = RingQueue::new(4);
        queue.enqueue(1u8);
        queue.enqueue(2);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), None);
        // Full capacity usable again after clear
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);
        assert_eq!(queue.len(), 3);
    }
}
