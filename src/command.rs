//! Command and event records exchanged over the rings.
//!
//! Commands flow from external producers to the engine; events flow from
//! the engine to subscribers. Both are fixed-size `Copy` records so the
//! rings can move them with plain memcpy.

/// External order identifier. Issued by the engine, monotonically
/// increasing; `0` is the "no order" sentinel.
pub type OrderId = u32;

/// Integer tick index in `[1, MAX_PRICE_LEVELS)`. `0` is not a valid price.
pub type Price = u32;

/// Order quantity. An order whose size reaches `0` is gone.
pub type Size = u32;

/// Opaque originator tag, assigned by whoever feeds the input ring.
pub type TraderId = u16;

/// Symbol index in `[0, MAX_SYMBOLS)`.
pub type SymbolId = u16;

/// Sentinel order id meaning "none" (list terminator, empty level, ...).
pub const NULL_ORDER_ID: OrderId = 0;

/// Order side (bid = buy, ask = sell)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    #[default]
    Bid = 0,
    /// Sell side (asks)
    Ask = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// Record tag shared by commands and events.
///
/// `Invalid` occupies the zero byte so that a zeroed record is harmless:
/// the input dispatcher drops anything it does not recognise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum EventType {
    /// Zeroed / uninitialised record; silently discarded
    #[default]
    Invalid = 0,
    /// New limit order (command) or order acceptance (event)
    Order = 1,
    /// Cancel request (command) or cancel confirmation (event)
    Cancel = 2,
    /// Trade execution (event only)
    Execution = 3,
    /// Command rejection (event only)
    Reject = 4,
}

/// Why a command was rejected.
///
/// `None` is the zero value carried by every non-reject event, so
/// consumers that ignore the field keep working.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectReason {
    /// Not a reject
    #[default]
    None = 0,
    /// Price was zero or outside the tick range
    InvalidPrice = 1,
    /// Size was zero
    InvalidQuantity = 2,
    /// Cancel named an id that is not live
    UnknownOrder = 3,
}

/// Input command consumed by the engine.
///
/// Unused fields for a given type are zero: a `Cancel` only carries
/// `order_id`, a new order carries everything but `order_id` (ids are
/// issued by the engine, never chosen by the client).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct InputCommand {
    pub kind: EventType,
    pub side: Side,
    pub symbol: SymbolId,
    pub trader: TraderId,
    pub price: Price,
    pub size: Size,
    pub order_id: OrderId,
}

impl InputCommand {
    /// Build a new limit order command
    #[inline]
    pub const fn limit(
        symbol: SymbolId,
        side: Side,
        price: Price,
        size: Size,
        trader: TraderId,
    ) -> Self {
        Self {
            kind: EventType::Order,
            side,
            symbol,
            trader,
            price,
            size,
            order_id: NULL_ORDER_ID,
        }
    }

    /// Build a cancel command for a previously issued order id
    #[inline]
    pub const fn cancel(order_id: OrderId) -> Self {
        Self {
            kind: EventType::Cancel,
            side: Side::Bid,
            symbol: 0,
            trader: 0,
            price: 0,
            size: 0,
            order_id,
        }
    }
}

/// Output event published by the engine.
///
/// Field population by type:
/// - `Order`: id, price, size, trader, symbol, side
/// - `Execution`: id (aggressor), counter_order_id (resting), price (the
///   resting order's price), size (fill), trader (aggressor), symbol,
///   side (aggressor side)
/// - `Cancel`: id
/// - `Reject`: reason
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct OutputEvent {
    pub kind: EventType,
    pub side: Side,
    pub symbol: SymbolId,
    pub trader: TraderId,
    pub reason: RejectReason,
    pub order_id: OrderId,
    pub price: Price,
    pub size: Size,
    pub counter_order_id: OrderId,
}

impl OutputEvent {
    /// Order accepted and assigned an id
    #[inline]
    pub const fn order(
        order_id: OrderId,
        price: Price,
        size: Size,
        trader: TraderId,
        symbol: SymbolId,
        side: Side,
    ) -> Self {
        Self {
            kind: EventType::Order,
            side,
            symbol,
            trader,
            reason: RejectReason::None,
            order_id,
            price,
            size,
            counter_order_id: NULL_ORDER_ID,
        }
    }

    /// Trade between an aggressor and a resting order
    #[inline]
    pub const fn execution(
        order_id: OrderId,
        counter_order_id: OrderId,
        price: Price,
        size: Size,
        trader: TraderId,
        symbol: SymbolId,
        side: Side,
    ) -> Self {
        Self {
            kind: EventType::Execution,
            side,
            symbol,
            trader,
            reason: RejectReason::None,
            order_id,
            price,
            size,
            counter_order_id,
        }
    }

    /// Order cancelled
    #[inline]
    pub const fn cancel(order_id: OrderId) -> Self {
        Self {
            kind: EventType::Cancel,
            side: Side::Bid,
            symbol: 0,
            trader: 0,
            reason: RejectReason::None,
            order_id,
            price: 0,
            size: 0,
            counter_order_id: NULL_ORDER_ID,
        }
    }

    /// Command rejected
    #[inline]
    pub const fn reject(reason: RejectReason) -> Self {
        Self {
            kind: EventType::Reject,
            side: Side::Bid,
            symbol: 0,
            trader: 0,
            reason,
            order_id: NULL_ORDER_ID,
            price: 0,
            size: 0,
            counter_order_id: NULL_ORDER_ID,
        }
    }
}
