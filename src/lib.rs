//! # flashmatch
//!
//! A single-threaded, multi-symbol limit order book matching engine fed
//! and drained by lock-free SPSC ring buffers.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one thread owns all books and the order pool;
//!   the only cross-thread state is the two rings
//! - **O(1) Operations**: id lookup, cancel, and per-fill work are all
//!   constant time; best-price repair is a lazy short scan
//! - **Pre-Allocated**: dense price ladders and a flat order pool, sized
//!   at construction; nothing allocates on the hot path
//! - **Cache-Conscious**: recycled order slots stay hot, ring cursors sit
//!   on separate cache lines
//!
//! ## Architecture
//!
//! ```text
//! [Producer Thread] --> [Command Ring] --> [Engine Thread]
//!                                               |
//!                        [Event Ring] <---------+
//!                             |
//!                      [Output Thread] --> callback
//! ```

pub mod command;
pub mod engine;
pub mod matching;
pub mod order_book;
pub mod pool;
pub mod price_level;
pub mod ring;

// Re-exports for convenience
pub use command::{
    EventType, InputCommand, OrderId, OutputEvent, Price, RejectReason, Side, Size, SymbolId,
    TraderId, NULL_ORDER_ID,
};
pub use engine::{run_output, Engine, DISTRIBUTOR_BUFFER};
pub use matching::{MatchingEngine, MAX_SYMBOLS};
pub use order_book::{OrderBook, MAX_PRICE_LEVELS};
pub use pool::{Order, OrderPool, FREE_SLOTS, MAX_ORDERS};
pub use price_level::PriceLevel;
pub use ring::{Consumer, Producer, RingBuffer, RING_SIZE};
