//! Matching Engine - price-time priority matching across all symbols.
//!
//! Owns every order book and the shared order pool, and publishes every
//! outcome straight onto the output ring. Runs strictly single-threaded:
//! the only synchronisation in the system lives in the rings on either
//! side of it.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::command::{
    EventType, InputCommand, NULL_ORDER_ID, OrderId, OutputEvent, Price, RejectReason, Side, Size,
    SymbolId, TraderId,
};
use crate::order_book::{OrderBook, MAX_PRICE_LEVELS};
use crate::pool::{Order, OrderPool, MAX_ORDERS};
use crate::ring::Producer;

/// Number of order books the engine carries.
pub const MAX_SYMBOLS: usize = 1 << 8;

/// The matching core: symbol table of books, the order pool, the id
/// generator, and the producer end of the event ring.
pub struct MatchingEngine {
    books: Vec<OrderBook>,
    pool: OrderPool,
    next_order_id: OrderId,
    events: Producer<OutputEvent>,
}

impl MatchingEngine {
    /// Engine over the full order-id space.
    pub fn new(events: Producer<OutputEvent>) -> Self {
        Self::with_capacity(MAX_ORDERS, events)
    }

    /// Engine with a smaller order pool for tests and benchmarks. The
    /// pool capacity bounds the ids that can be issued, so `max_orders`
    /// must exceed the number of accepted orders in the session.
    pub fn with_capacity(max_orders: usize, events: Producer<OutputEvent>) -> Self {
        Self {
            books: (0..MAX_SYMBOLS).map(|_| OrderBook::new()).collect(),
            pool: OrderPool::with_capacity(max_orders),
            next_order_id: 0,
            events,
        }
    }

    /// Dispatch one input command. Unrecognised types are dropped.
    #[inline]
    pub fn apply(&mut self, cmd: &InputCommand) {
        match cmd.kind {
            EventType::Order => self.limit(cmd.symbol, cmd.side, cmd.price, cmd.size, cmd.trader),
            EventType::Cancel => self.cancel(cmd.order_id),
            _ => {}
        }
    }

    /// Process a new limit order: validate, assign an id, match against
    /// the opposite side, rest any remainder.
    ///
    /// `symbol < MAX_SYMBOLS` is the caller's responsibility and is not
    /// re-checked here.
    pub fn limit(
        &mut self,
        symbol: SymbolId,
        side: Side,
        price: Price,
        size: Size,
        trader: TraderId,
    ) {
        if price == 0 || price >= MAX_PRICE_LEVELS as Price {
            self.events.push(OutputEvent::reject(RejectReason::InvalidPrice));
            return;
        }
        if size == 0 {
            self.events.push(OutputEvent::reject(RejectReason::InvalidQuantity));
            return;
        }

        self.next_order_id += 1;
        let id = self.next_order_id;
        let slot = self.pool.allocate(id);

        self.events
            .push(OutputEvent::order(id, price, size, trader, symbol, side));

        let book = &mut self.books[symbol as usize];
        let remaining = match_order(
            book,
            &mut self.pool,
            &mut self.events,
            symbol,
            side,
            price,
            size,
            trader,
            id,
        );

        if remaining > 0 {
            add_to_book(book, &mut self.pool, symbol, side, price, remaining, id, slot);
        } else {
            // Fully filled on entry: the id is terminal, give the slot back.
            self.pool.release(id, slot);
        }
    }

    /// Cancel a resting order by id.
    ///
    /// Ids that were never issued, already filled, or already cancelled
    /// all land on a zero slot mapping (or a zero size) and reject; a
    /// reject leaves no state change behind.
    pub fn cancel(&mut self, id: OrderId) {
        if id == NULL_ORDER_ID || id > self.next_order_id {
            self.events.push(OutputEvent::reject(RejectReason::UnknownOrder));
            return;
        }

        let slot = self.pool.slot_of(id);
        if slot == 0 {
            self.events.push(OutputEvent::reject(RejectReason::UnknownOrder));
            return;
        }

        let order = self.pool.get(slot);
        if order.size == 0 {
            self.events.push(OutputEvent::reject(RejectReason::UnknownOrder));
            return;
        }
        let (symbol, order_side, order_price) = (order.symbol, order.side, order.price);

        let book = &mut self.books[symbol as usize];
        book.level_mut(order_side, order_price).remove(&mut self.pool, id);
        self.pool.get_mut(slot).size = 0;

        // The best-price cursor is left pointing at the (possibly now
        // empty) level; the next match repairs it lazily.
        self.pool.release(id, slot);
        self.events.push(OutputEvent::cancel(id));
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[inline]
    pub fn book(&self, symbol: SymbolId) -> &OrderBook {
        &self.books[symbol as usize]
    }

    #[inline]
    pub fn best_bid(&self, symbol: SymbolId) -> Option<Price> {
        self.books[symbol as usize].best_bid()
    }

    #[inline]
    pub fn best_ask(&self, symbol: SymbolId) -> Option<Price> {
        self.books[symbol as usize].best_ask()
    }

    /// Remaining size of a live order, or `None` if the id is not live.
    pub fn resting_size(&self, id: OrderId) -> Option<Size> {
        if id == NULL_ORDER_ID || id > self.next_order_id {
            return None;
        }
        let slot = self.pool.slot_of(id);
        if slot == 0 {
            return None;
        }
        match self.pool.get(slot).size {
            0 => None,
            size => Some(size),
        }
    }

    /// Number of ids currently bound to pool slots (resting orders).
    #[inline]
    pub fn order_count(&self) -> usize {
        self.pool.live() as usize
    }

    /// Highest id issued so far.
    #[inline]
    pub fn last_order_id(&self) -> OrderId {
        self.next_order_id
    }

    /// Pre-fault the pool pages before entering the hot loop.
    pub fn warm_up(&mut self) {
        self.pool.warm_up();
    }

    /// Hash of the externally observable engine state, for determinism
    /// checks across runs.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for book in &self.books {
            book.bid_max().hash(&mut hasher);
            book.ask_min().hash(&mut hasher);
        }
        self.pool.live().hash(&mut hasher);
        self.next_order_id.hash(&mut hasher);
        hasher.finish()
    }
}

/// Sweep the opposite side of the book until the aggressor is exhausted,
/// the book runs out, or the next level is worse than the limit price.
/// Returns the unfilled remainder.
#[allow(clippy::too_many_arguments)]
fn match_order(
    book: &mut OrderBook,
    pool: &mut OrderPool,
    events: &mut Producer<OutputEvent>,
    symbol: SymbolId,
    side: Side,
    price: Price,
    size: Size,
    trader: TraderId,
    id: OrderId,
) -> Size {
    let mut remaining = size;

    match side {
        Side::Bid => {
            while remaining > 0
                && book.ask_min < MAX_PRICE_LEVELS as Price
                && book.ask_min <= price
            {
                let level_price = book.ask_min;
                remaining = match_level(
                    &mut book.ask_levels[level_price as usize],
                    pool,
                    events,
                    remaining,
                    level_price,
                    symbol,
                    side,
                    trader,
                    id,
                );
                // Rescan only once the level at the cursor has drained;
                // while it still has depth the cursor is already right.
                if book.ask_levels[level_price as usize].is_empty() {
                    book.update_best_ask();
                }
            }
        }
        Side::Ask => {
            while remaining > 0 && book.bid_max > 0 && book.bid_max >= price {
                let level_price = book.bid_max;
                remaining = match_level(
                    &mut book.bid_levels[level_price as usize],
                    pool,
                    events,
                    remaining,
                    level_price,
                    symbol,
                    side,
                    trader,
                    id,
                );
                if book.bid_levels[level_price as usize].is_empty() {
                    book.update_best_bid();
                }
            }
        }
    }

    remaining
}

/// Consume one price level head-first (oldest resting order wins) until
/// the aggressor is exhausted or the level is empty.
#[allow(clippy::too_many_arguments)]
fn match_level(
    level: &mut crate::price_level::PriceLevel,
    pool: &mut OrderPool,
    events: &mut Producer<OutputEvent>,
    mut remaining: Size,
    level_price: Price,
    symbol: SymbolId,
    side: Side,
    trader: TraderId,
    taker_id: OrderId,
) -> Size {
    let mut current = level.head;
    while current != NULL_ORDER_ID && remaining > 0 {
        let slot = pool.slot_of(current);
        let resting = pool.get(slot);
        let next = resting.next; // save before a potential unlink
        let fill = remaining.min(resting.size);

        // Trades print at the resting order's price.
        events.push(OutputEvent::execution(
            taker_id,
            current,
            level_price,
            fill,
            trader,
            symbol,
            side,
        ));

        remaining -= fill;
        let resting = pool.get_mut(slot);
        resting.size -= fill;

        if resting.size == 0 {
            level.remove(pool, current);
            pool.release(current, slot);
        }

        current = next;
    }

    remaining
}

/// Rest the unfilled remainder at the tail of its price level, improving
/// the best-price cursor if the new order tightens the book.
#[allow(clippy::too_many_arguments)]
fn add_to_book(
    book: &mut OrderBook,
    pool: &mut OrderPool,
    symbol: SymbolId,
    side: Side,
    price: Price,
    remaining: Size,
    id: OrderId,
    slot: u32,
) {
    let level = match side {
        Side::Bid => {
            if price > book.bid_max {
                book.bid_max = price;
            }
            &mut book.bid_levels[price as usize]
        }
        Side::Ask => {
            if price < book.ask_min {
                book.ask_min = price;
            }
            &mut book.ask_levels[price as usize]
        }
    };

    *pool.get_mut(slot) = Order {
        size: remaining,
        prev: NULL_ORDER_ID,
        next: NULL_ORDER_ID,
        price,
        symbol,
        side,
    };
    level.push_back(pool, id);
}
