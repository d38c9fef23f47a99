//! Order Book - dense bid/ask price ladders for one symbol.
//!
//! Both sides are flat arrays of [`PriceLevel`] indexed directly by tick,
//! so reaching any level is one array access. The best-price cursors are
//! maintained incrementally on insert and repaired lazily (linear scan)
//! only after the current best level drains; with activity clustered at
//! the top of book the scans amortise to a handful of probes.

use crate::command::{Price, Side};
use crate::price_level::PriceLevel;

/// Number of price ticks per side. Valid prices are `1..MAX_PRICE_LEVELS`;
/// `0` doubles as "no bid" and `MAX_PRICE_LEVELS` as "no ask".
pub const MAX_PRICE_LEVELS: usize = 1 << 14;

/// Per-symbol book: two price ladders plus cached best-price cursors.
pub struct OrderBook {
    pub(crate) bid_levels: Vec<PriceLevel>,
    pub(crate) ask_levels: Vec<PriceLevel>,

    /// Highest price with bid interest, or `0` when there are no bids.
    /// May point at a drained level between a cancel and the next match.
    pub(crate) bid_max: Price,
    /// Lowest price with ask interest, or `MAX_PRICE_LEVELS` when none.
    pub(crate) ask_min: Price,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bid_levels: vec![PriceLevel::new(); MAX_PRICE_LEVELS],
            ask_levels: vec![PriceLevel::new(); MAX_PRICE_LEVELS],
            bid_max: 0,
            ask_min: MAX_PRICE_LEVELS as Price,
        }
    }

    /// Walk the bid cursor down to the next non-empty level, or to `0`
    /// when no bids remain.
    pub fn update_best_bid(&mut self) {
        let mut price = self.bid_max;
        while price > 0 {
            if self.bid_levels[price as usize].count > 0 {
                self.bid_max = price;
                return;
            }
            price -= 1;
        }
        self.bid_max = 0;
    }

    /// Walk the ask cursor up to the next non-empty level, or to
    /// `MAX_PRICE_LEVELS` when no asks remain.
    pub fn update_best_ask(&mut self) {
        let mut price = self.ask_min;
        while price < MAX_PRICE_LEVELS as Price {
            if self.ask_levels[price as usize].count > 0 {
                self.ask_min = price;
                return;
            }
            price += 1;
        }
        self.ask_min = MAX_PRICE_LEVELS as Price;
    }

    /// Raw bid cursor (`0` = no bids)
    #[inline]
    pub fn bid_max(&self) -> Price {
        self.bid_max
    }

    /// Raw ask cursor (`MAX_PRICE_LEVELS` = no asks)
    #[inline]
    pub fn ask_min(&self) -> Price {
        self.ask_min
    }

    /// Best bid price, if any bid is resting
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        if self.bid_max == 0 {
            None
        } else {
            Some(self.bid_max)
        }
    }

    /// Best ask price, if any ask is resting
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        if self.ask_min == MAX_PRICE_LEVELS as Price {
            None
        } else {
            Some(self.ask_min)
        }
    }

    #[inline]
    pub fn level(&self, side: Side, price: Price) -> &PriceLevel {
        match side {
            Side::Bid => &self.bid_levels[price as usize],
            Side::Ask => &self.ask_levels[price as usize],
        }
    }

    #[inline]
    pub(crate) fn level_mut(&mut self, side: Side, price: Price) -> &mut PriceLevel {
        match side {
            Side::Bid => &mut self.bid_levels[price as usize],
            Side::Ask => &mut self.ask_levels[price as usize],
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("bid_max", &self.bid_max)
            .field("ask_min", &self.ask_min)
            .finish()
    }
}
