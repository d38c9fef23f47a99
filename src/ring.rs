//! SPSC Ring - wait-free bounded queue between exactly two threads.
//!
//! One producer thread and one consumer thread share a power-of-two
//! circular buffer. The cursors are free-running 64-bit counters, masked
//! at indexing time, so full/empty fall out of a single subtraction and
//! the whole capacity is usable (no reserved sentinel slot).
//!
//! ## Memory ordering
//!
//! The producer publishes `write_pos` with release after storing the
//! element; the consumer loads it with acquire before reading the element.
//! The symmetric pair on `read_pos` keeps the producer from overwriting a
//! slot the consumer has not drained. Buffer accesses themselves are plain.
//!
//! ## Back-pressure
//!
//! `push` on a full ring and `read` on an empty ring are pure spin loops.
//! There is no timeout, no error return, and no way to close the ring;
//! the ring is meant to sit between dedicated cores.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

/// Number of slots in every ring. Must be a power of two.
pub const RING_SIZE: usize = 1 << 16;

/// Mask for fast modulo on the free-running cursors.
pub const RING_MASK: u64 = RING_SIZE as u64 - 1;

/// Shared ring storage. Constructed once and split into a [`Producer`]
/// and a [`Consumer`]; never used directly.
pub struct RingBuffer<T> {
    buffer: Box<[UnsafeCell<T>]>,

    // CachePadded keeps each cursor on its own cache line; otherwise the
    // producer and consumer cores ping-pong the line on every operation.
    write_pos: CachePadded<AtomicU64>,
    read_pos: CachePadded<AtomicU64>,
}

// Safety: only the producer writes buffer slots and only the consumer
// reads them, with the release/acquire cursor pair ordering each slot's
// write before its read. Both handles may move across threads.
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T: Copy + Default> RingBuffer<T> {
    /// Allocate a ring and split it into its two endpoints.
    ///
    /// The handles are `Send` but not `Clone`, and all their operations
    /// take `&mut self`: the single-producer/single-consumer contract is
    /// enforced by the type system instead of being trusted.
    pub fn new() -> (Producer<T>, Consumer<T>) {
        let ring = Arc::new(RingBuffer {
            buffer: (0..RING_SIZE)
                .map(|_| UnsafeCell::new(T::default()))
                .collect(),
            write_pos: CachePadded::new(AtomicU64::new(0)),
            read_pos: CachePadded::new(AtomicU64::new(0)),
        });
        (
            Producer { ring: Arc::clone(&ring) },
            Consumer { ring },
        )
    }
}

impl<T> RingBuffer<T> {
    #[inline]
    fn occupied(&self) -> u64 {
        self.write_pos.load(Ordering::Acquire) - self.read_pos.load(Ordering::Acquire)
    }
}

/// Write end of a ring. Exactly one per ring.
pub struct Producer<T> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: Copy> Producer<T> {
    /// Append one element, spinning while the ring is full.
    ///
    /// Never fails and never drops: the element is in the ring when this
    /// returns.
    #[inline]
    pub fn push(&mut self, value: T) {
        let ring = &*self.ring;
        loop {
            let write = ring.write_pos.load(Ordering::Relaxed);
            let read = ring.read_pos.load(Ordering::Acquire);

            if write - read < RING_SIZE as u64 {
                // Safety: the slot at `write` is outside the consumer's
                // visible range until the store below publishes it.
                unsafe { ring.buffer[(write & RING_MASK) as usize].get().write(value) };
                ring.write_pos.store(write + 1, Ordering::Release);
                return;
            }

            std::hint::spin_loop();
        }
    }

    /// Number of elements currently buffered (racy, for reporting only).
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.occupied() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read end of a ring. Exactly one per ring.
pub struct Consumer<T> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: Copy> Consumer<T> {
    /// Copy up to `out.len()` elements into `out`, spinning while the
    /// ring is empty. Returns the number copied, always at least 1.
    #[inline]
    pub fn read(&mut self, out: &mut [T]) -> usize {
        debug_assert!(!out.is_empty());
        loop {
            let n = self.copy_available(out);
            if n > 0 {
                return n;
            }
            std::hint::spin_loop();
        }
    }

    /// Non-blocking variant of [`read`](Self::read): returns 0 instead of
    /// spinning when the ring is empty. Used by tests and drain helpers;
    /// the dispatch loops use `read`.
    #[inline]
    pub fn try_read(&mut self, out: &mut [T]) -> usize {
        self.copy_available(out)
    }

    fn copy_available(&self, out: &mut [T]) -> usize {
        let ring = &*self.ring;
        let write = ring.write_pos.load(Ordering::Acquire);
        let read = ring.read_pos.load(Ordering::Relaxed);

        let available = write - read;
        if available == 0 {
            return 0;
        }

        let count = (available as usize).min(out.len());
        for (i, slot) in out.iter_mut().take(count).enumerate() {
            // Safety: indices in [read, read + count) have been published
            // by the release store on write_pos observed above.
            *slot = unsafe { ring.buffer[((read + i as u64) & RING_MASK) as usize].get().read() };
        }

        ring.read_pos.store(read + count as u64, Ordering::Release);
        count
    }

    /// Number of elements currently buffered (racy, for reporting only).
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.occupied() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
