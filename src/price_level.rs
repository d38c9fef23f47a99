//! Price Level - FIFO queue of resting orders at one tick.
//!
//! The queue is an intrusive doubly-linked list threaded through the
//! order pool by order id: the level stores only `head`, `tail` and a
//! count, and each order's `prev`/`next` ids carry the links. Append and
//! unlink are O(1) from any position, which is what makes cancel cheap.

use crate::command::{NULL_ORDER_ID, OrderId};
use crate::pool::OrderPool;

/// Queue of orders at a specific price, oldest first.
///
/// Invariant: `count == 0` exactly when `head` and `tail` are both the
/// null id, and `count` always equals the length of the chain from
/// `head` through `next`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriceLevel {
    /// Oldest order (first to match)
    pub head: OrderId,
    /// Newest order (last to match)
    pub tail: OrderId,
    /// Number of resting orders at this level
    pub count: u32,
}

impl PriceLevel {
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: NULL_ORDER_ID,
            tail: NULL_ORDER_ID,
            count: 0,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append an order at the tail (lowest time priority).
    ///
    /// The order's record must already be written to its slot; this only
    /// fixes up the linkage.
    #[inline]
    pub fn push_back(&mut self, pool: &mut OrderPool, id: OrderId) {
        if self.head == NULL_ORDER_ID {
            debug_assert!(self.tail == NULL_ORDER_ID);
            self.head = id;
            self.tail = id;
        } else {
            let tail_slot = pool.slot_of(self.tail);
            pool.get_mut(tail_slot).next = id;

            let slot = pool.slot_of(id);
            pool.get_mut(slot).prev = self.tail;
            self.tail = id;
        }
        self.count += 1;
    }

    /// Splice an order out of the queue, from any position.
    ///
    /// Clears the removed order's links; its slot stays allocated and the
    /// caller decides whether to release it.
    #[inline]
    pub fn remove(&mut self, pool: &mut OrderPool, id: OrderId) {
        let slot = pool.slot_of(id);
        let (prev, next) = {
            let order = pool.get(slot);
            (order.prev, order.next)
        };

        if prev != NULL_ORDER_ID {
            let prev_slot = pool.slot_of(prev);
            pool.get_mut(prev_slot).next = next;
        } else {
            debug_assert_eq!(self.head, id);
            self.head = next;
        }

        if next != NULL_ORDER_ID {
            let next_slot = pool.slot_of(next);
            pool.get_mut(next_slot).prev = prev;
        } else {
            debug_assert_eq!(self.tail, id);
            self.tail = prev;
        }

        let order = pool.get_mut(slot);
        order.prev = NULL_ORDER_ID;
        order.next = NULL_ORDER_ID;
        self.count -= 1;
    }
}
