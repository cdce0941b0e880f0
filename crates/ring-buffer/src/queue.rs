//! Ring buffer implementation
//!
//! Mirrors the original firmware's `newqueue.c`: indices are byte offsets
//! into a flat backing buffer, advanced one byte at a time, so overwrite
//! detection (and `overwrite_count`) is inherently byte-granular rather than
//! record-granular. See the module docs for why that is preserved rather
//! than "fixed".

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use thiserror::Error;

/// Failure to reserve backing storage for a [`Queue`].
#[derive(Debug, Error)]
#[error("failed to allocate {0} bytes for ring buffer backing storage")]
pub struct CapacityError(pub usize);

/// Whether a pop consumes the bytes it reads or leaves the queue untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopMode {
    /// Advance `tail` and decrement `unread_items` (normal consuming read).
    Consume,
    /// Read the bytes but restore `tail`/`unread_items` to their pre-call
    /// values exactly, so a subsequent `Consume` or `Peek` sees the same data.
    Peek,
}

/// Fixed-capacity byte-indexed SPSC queue of `num_items` records of
/// `size_of::<T>()` bytes each.
///
/// Backing storage is allocated once at [`Queue::new`] and never resized or
/// freed for the lifetime of the queue, matching the firmware's
/// allocate-once-at-bring-up lifecycle.
pub struct Queue<T> {
    buffer: UnsafeCell<Box<[u8]>>,
    item_size: usize,
    num_items: usize,
    buffer_size: usize,
    head: AtomicUsize,
    tail: AtomicUsize,
    unread_items: AtomicUsize,
    overwrite_count: AtomicU64,
    _marker: PhantomData<T>,
}

// SAFETY: Queue is intended for single-producer/single-consumer use: one
// role only ever advances `head` via `push`, the other only ever advances
// `tail` via `pop`. The atomics at the head/tail boundary give the
// acquire/release pairing needed for that handoff to be observed correctly
// even when producer and consumer are different execution contexts (ISR vs.
// foreground loop).
unsafe impl<T> Sync for Queue<T> {}
unsafe impl<T> Send for Queue<T> {}

impl<T: Copy> Queue<T> {
    /// Reserve a queue capable of holding `num_items` records.
    ///
    /// # Panics
    /// Panics if allocation fails. Use [`Queue::try_new`] to handle that
    /// explicitly (the embedded target's `CapacityError` return).
    pub fn new(num_items: usize) -> Self {
        Self::try_new(num_items).expect("ring buffer allocation failed")
    }

    /// Reserve a queue capable of holding `num_items` records, returning
    /// [`CapacityError`] instead of panicking if backing storage can't be
    /// acquired.
    pub fn try_new(num_items: usize) -> Result<Self, CapacityError> {
        let item_size = size_of::<T>().max(1);
        let buffer_size = num_items * item_size;
        let buffer = vec![0u8; buffer_size].into_boxed_slice();
        if buffer.len() != buffer_size {
            return Err(CapacityError(buffer_size));
        }
        Ok(Self {
            buffer: UnsafeCell::new(buffer),
            item_size,
            num_items,
            buffer_size,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            unread_items: AtomicUsize::new(0),
            overwrite_count: AtomicU64::new(0),
            _marker: PhantomData,
        })
    }

    /// Size of one record, in bytes.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Capacity, in records.
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Capacity of the backing buffer, in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Number of fully readable records currently queued
    /// (`unread_items / item_size`).
    pub fn available(&self) -> usize {
        self.unread_items.load(Ordering::Acquire) / self.item_size
    }

    /// Total byte-level overwrite events since construction. Counts bytes
    /// dropped, not records — pushing `k` records into a full `N`-record
    /// queue increments this by `k * item_size`, not `k`. See module docs.
    pub fn overwrite_count(&self) -> u64 {
        self.overwrite_count.load(Ordering::Relaxed)
    }

    fn advance_head_one_byte(&self) {
        let head = self.head.load(Ordering::Relaxed);
        let next_head = if head < self.buffer_size - 1 { head + 1 } else { 0 };
        self.head.store(next_head, Ordering::Release);

        let unread = self.unread_items.load(Ordering::Relaxed);
        if unread < self.buffer_size {
            self.unread_items.store(unread + 1, Ordering::Release);
        } else {
            self.overwrite_count.fetch_add(1, Ordering::Relaxed);
            let tail = self.tail.load(Ordering::Relaxed);
            let next_tail = if tail < self.buffer_size - 1 { tail + 1 } else { 0 };
            self.tail.store(next_tail, Ordering::Release);
        }
    }

    fn advance_tail_one_byte(&self) {
        self.unread_items.fetch_sub(1, Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        let next_tail = if tail < self.buffer_size - 1 { tail + 1 } else { 0 };
        self.tail.store(next_tail, Ordering::Release);
    }

    fn retreat_tail_one_byte(&self) {
        self.unread_items.fetch_add(1, Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        let prev_tail = if tail > 0 { tail - 1 } else { self.buffer_size - 1 };
        self.tail.store(prev_tail, Ordering::Release);
    }

    /// Push `items` into the queue, one byte at a time per spec. When the
    /// queue is full, the oldest bytes are overwritten and
    /// [`Queue::overwrite_count`] increments accordingly. Never fails.
    pub fn push(&self, items: &[T]) {
        // SAFETY: single producer; byte reinterpretation of `T: Copy` is
        // sound because `T` has no interior padding we read back as T again
        // (we only ever read bytes back out through the same Copy type).
        let bytes: &[u8] = unsafe {
            std::slice::from_raw_parts(items.as_ptr() as *const u8, items.len() * self.item_size)
        };
        let buf = unsafe { &mut *self.buffer.get() };
        for &b in bytes {
            let head = self.head.load(Ordering::Relaxed);
            buf[head] = b;
            self.advance_head_one_byte();
        }
    }

    /// Pop `dst.len()` records into `dst`. Caller must ensure
    /// `available() >= dst.len()` first; this never fails on an
    /// under-populated queue (it simply reads whatever bytes are present).
    ///
    /// Under [`PopMode::Peek`], `tail` and `unread_items` are restored to
    /// their exact pre-call values once the read completes.
    pub fn pop(&self, dst: &mut [T], mode: PopMode) {
        let n_bytes = dst.len() * self.item_size;
        let buf = unsafe { &*self.buffer.get() };
        let out: &mut [u8] = unsafe {
            std::slice::from_raw_parts_mut(dst.as_mut_ptr() as *mut u8, n_bytes)
        };
        for slot in out.iter_mut() {
            let tail = self.tail.load(Ordering::Relaxed);
            *slot = buf[tail];
            self.advance_tail_one_byte();
        }
        if mode == PopMode::Peek {
            for _ in 0..n_bytes {
                self.retreat_tail_one_byte();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariants_hold_after_fresh_init() {
        let q: Queue<u8> = Queue::new(4);
        assert_eq!(q.available(), 0);
        assert_eq!(q.overwrite_count(), 0);
        assert_eq!(q.buffer_size(), 4);
    }

    #[test]
    fn no_overwrite_round_trip_preserves_order() {
        let q: Queue<u8> = Queue::new(8);
        q.push(&[1, 2, 3]);
        assert_eq!(q.available(), 3);
        let mut out = [0u8; 3];
        q.pop(&mut out, PopMode::Consume);
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(q.available(), 0);
    }

    /// Capacity 4 items of 1 byte, push [1..6]: overwrite_count == 2, pop 4
    /// yields [3,4,5,6].
    #[test]
    fn overwrite_by_k_drops_oldest_k_and_counts_exactly_k() {
        let q: Queue<u8> = Queue::new(4);
        q.push(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(q.overwrite_count(), 2);
        let mut out = [0u8; 4];
        q.pop(&mut out, PopMode::Consume);
        assert_eq!(out, [3, 4, 5, 6]);
    }

    /// Peek is non-destructive and idempotent.
    #[test]
    fn peek_then_pop_yields_same_bytes_twice() {
        let q: Queue<u8> = Queue::new(8);
        q.push(&[10, 20, 30]);

        let mut peeked = [0u8; 2];
        q.pop(&mut peeked, PopMode::Peek);
        assert_eq!(peeked, [10, 20]);
        assert_eq!(q.available(), 3);

        let mut peeked_again = [0u8; 2];
        q.pop(&mut peeked_again, PopMode::Peek);
        assert_eq!(peeked_again, peeked);

        let mut popped = [0u8; 3];
        q.pop(&mut popped, PopMode::Consume);
        assert_eq!(popped, [10, 20, 30]);
        assert_eq!(q.available(), 0);
    }

    #[test]
    fn peek_is_idempotent_across_repeated_calls() {
        let q: Queue<u8> = Queue::new(8);
        q.push(&[1, 2, 3, 4]);
        let mut a = [0u8; 4];
        let mut b = [0u8; 4];
        q.pop(&mut a, PopMode::Peek);
        q.pop(&mut b, PopMode::Peek);
        assert_eq!(a, b);
        assert_eq!(q.available(), 4);
    }

    #[test]
    fn multi_byte_record_overwrite_counts_bytes_not_records() {
        #[derive(Copy, Clone)]
        struct Pair(u8, u8);
        let q: Queue<Pair> = Queue::new(2);
        q.push(&[Pair(1, 1), Pair(2, 2), Pair(3, 3)]);
        // 1 record of 2 bytes overwritten.
        assert_eq!(q.overwrite_count(), 2);
    }

    proptest::proptest! {
        #[test]
        fn push_pop_without_overflow_preserves_order(xs in proptest::collection::vec(0u8..=255, 1..16)) {
            let q: Queue<u8> = Queue::new(32);
            q.push(&xs);
            let mut out = vec![0u8; xs.len()];
            q.pop(&mut out, PopMode::Consume);
            proptest::prop_assert_eq!(out, xs);
        }

        #[test]
        fn overwrite_count_matches_excess_bytes(total in 5usize..40) {
            let capacity = 4;
            let q: Queue<u8> = Queue::new(capacity);
            let xs: Vec<u8> = (0..total as u32).map(|i| (i % 256) as u8).collect();
            q.push(&xs);
            let expected_overwrites = total.saturating_sub(capacity);
            proptest::prop_assert_eq!(q.overwrite_count(), expected_overwrites as u64);
        }
    }
}
