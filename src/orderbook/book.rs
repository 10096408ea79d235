//! Top-of-book limit order book.
//!
//! ## Architecture
//!
//! - **Order slab**: arena of `OrderNode`s addressed by `usize` handles
//! - **Level slab**: arena of `PriceLevel`s, referenced from each node
//! - **PriceIndex**: price -> level handle, one per side
//! - **HashMap**: order ID -> order handle for O(1) cancel
//! - **Best handles**: cached head order of the best bid and best ask level
//!
//! ## Crossing Rule
//!
//! Orders are never matched. A sell at or below the best bid, or a buy at or
//! above the best ask, is rejected without touching the book. Best ask is
//! therefore always strictly above best bid.
//!
//! ## Example
//!
//! ```
//! use tob_book::orderbook::OrderBook;
//! use tob_book::types::Side;
//!
//! let mut book = OrderBook::with_capacity(1_000);
//!
//! let events = book.submit(1, 100, 10, Side::Buy, 1).unwrap();
//! let lines: Vec<String> = events.iter().map(|e| e.to_string()).collect();
//! assert_eq!(lines, vec!["A, 1, 1", "B, B, 100, 10"]);
//!
//! // A sell at the bid would cross and is rejected
//! let events = book.submit(2, 100, 5, Side::Sell, 2).unwrap();
//! assert_eq!(events[0].to_string(), "R, 2, 2");
//! ```

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use slab::Slab;
use tracing::trace;

use crate::error::{BookError, Result};
use crate::orderbook::{LevelSummary, OrderNode, PriceIndex, PriceLevel};
use crate::types::{BookEvent, Order, Quote, Side};

/// Single-instrument order book with cached top of book.
#[derive(Debug)]
pub struct OrderBook {
    /// Resting orders
    orders: Slab<OrderNode>,

    /// Price levels of both sides
    levels: Slab<PriceLevel>,

    /// Bid price -> level handle
    bids: PriceIndex<usize>,

    /// Ask price -> level handle
    asks: PriceIndex<usize>,

    /// Order ID -> order handle
    order_index: HashMap<u64, usize>,

    /// Head order of the highest bid level
    best_bid: Option<usize>,

    /// Head order of the lowest ask level
    best_ask: Option<usize>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with pre-allocated room for `order_capacity` orders
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            levels: Slab::new(),
            bids: PriceIndex::new(),
            asks: PriceIndex::new(),
            order_index: HashMap::with_capacity(order_capacity),
            best_bid: None,
            best_ask: None,
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Submit a new limit order.
    ///
    /// Emits `R` if the order would cross the book, otherwise `A` followed by
    /// a top-of-book event when the order lands at or improves the best price
    /// of its side.
    ///
    /// # Errors
    ///
    /// `DuplicateOrderId` if `order_id` is already resting, and
    /// `VolumeOverflow` if `quantity` does not fit in the volume already
    /// resting at `price`. Nothing is mutated in either case.
    pub fn submit(
        &mut self,
        owner_id: u64,
        price: u64,
        quantity: u64,
        side: Side,
        order_id: u64,
    ) -> Result<Vec<BookEvent>> {
        if self.order_index.contains_key(&order_id) {
            return Err(BookError::DuplicateOrderId(order_id));
        }

        if self.crosses(side, price) {
            trace!(order_id, owner_id, price, %side, "rejected crossing order");
            return Ok(vec![BookEvent::Rejected { owner_id, order_id }]);
        }

        let existing = self.index(side).search(price).copied();
        if let Some(key) = existing {
            if !self.levels[key].can_absorb(quantity) {
                return Err(BookError::VolumeOverflow { order_id, price });
            }
        }
        let level_key = match existing {
            Some(key) => key,
            None => {
                let key = self.levels.insert(PriceLevel::new(price, side));
                self.index_mut(side).insert(price, key);
                key
            }
        };

        let order = Order::new(order_id, owner_id, side, price, quantity);
        let key = self.orders.insert(OrderNode::new(order, level_key));
        self.levels[level_key].push_back(key, &mut self.orders);
        self.order_index.insert(order_id, key);

        trace!(order_id, owner_id, price, quantity, %side, "order resting");

        let mut events = Vec::with_capacity(2);
        events.push(BookEvent::Accepted { owner_id, order_id });

        match self.best_price(side) {
            Some(best) if best == price => {
                // Volume at the top changed; the head keeps its priority
                events.push(self.top_of_book(side));
            }
            Some(best) if !side.improves(price, best) => {}
            _ => {
                *self.best_slot(side) = Some(key);
                events.push(self.top_of_book(side));
            }
        }

        Ok(events)
    }

    /// Cancel a resting order.
    ///
    /// Emits `A` followed by a top-of-book event if the cancel changed the
    /// best price or the volume resting at it.
    ///
    /// # Errors
    ///
    /// `OrderNotFound` if `order_id` is not resting. Nothing is mutated in
    /// that case.
    pub fn cancel(&mut self, order_id: u64) -> Result<Vec<BookEvent>> {
        let key = *self
            .order_index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound(order_id))?;

        let node = &self.orders[key];
        let (owner_id, price, side, level_key) =
            (node.owner_id(), node.price(), node.side(), node.level);
        let was_best = self.best(side) == Some(key);

        let tob_changed = if self.levels[level_key].order_count == 1 {
            // Last order at this price: the whole level goes
            self.index_mut(side).delete(price);
            self.levels.remove(level_key);

            if was_best {
                let adjacent = match side {
                    Side::Sell => self.asks.successor(price),
                    Side::Buy => self.bids.predecessor(price),
                };
                let next_best = adjacent.and_then(|(_, &lk)| self.levels[lk].peek_head());
                *self.best_slot(side) = next_best;
            }
            was_best
        } else {
            let level = &mut self.levels[level_key];
            level.remove(key, &mut self.orders);
            let new_head = level.peek_head();

            if was_best {
                *self.best_slot(side) = new_head;
            }
            self.best_price(side) == Some(price)
        };

        self.orders.remove(key);
        self.order_index.remove(&order_id);

        trace!(order_id, owner_id, price, %side, tob_changed, "order cancelled");

        let mut events = Vec::with_capacity(2);
        events.push(BookEvent::Accepted { owner_id, order_id });
        if tob_changed {
            events.push(self.top_of_book(side));
        }
        Ok(events)
    }

    /// Drop every resting order
    pub fn clear(&mut self) {
        self.orders.clear();
        self.levels.clear();
        self.bids.clear();
        self.asks.clear();
        self.order_index.clear();
        self.best_bid = None;
        self.best_ask = None;
    }

    // ========================================================================
    // Top of Book
    // ========================================================================

    /// Current top-of-book event for `side`
    pub fn top_of_book(&self, side: Side) -> BookEvent {
        let quote = self
            .best(side)
            .map(|key| self.levels[self.orders[key].level].quote());
        BookEvent::TopOfBook { side, quote }
    }

    /// Best bid price and the volume resting at it
    pub fn best_bid(&self) -> Option<Quote> {
        self.best_quote(Side::Buy)
    }

    /// Best ask price and the volume resting at it
    pub fn best_ask(&self) -> Option<Quote> {
        self.best_quote(Side::Sell)
    }

    /// Order representing the best price of `side` (head of the best level)
    pub fn best_order(&self, side: Side) -> Option<&Order> {
        self.best(side).map(|key| &self.orders[key].order)
    }

    /// True if an order at `price` on `side` would cross the book
    pub fn crosses(&self, side: Side, price: u64) -> bool {
        match self.best_price(side.opposite()) {
            Some(opposite) => match side {
                Side::Sell => price <= opposite,
                Side::Buy => price >= opposite,
            },
            None => false,
        }
    }

    fn best_quote(&self, side: Side) -> Option<Quote> {
        match self.top_of_book(side) {
            BookEvent::TopOfBook { quote, .. } => quote,
            _ => None,
        }
    }

    #[inline]
    fn best(&self, side: Side) -> Option<usize> {
        match side {
            Side::Buy => self.best_bid,
            Side::Sell => self.best_ask,
        }
    }

    #[inline]
    fn best_slot(&mut self, side: Side) -> &mut Option<usize> {
        match side {
            Side::Buy => &mut self.best_bid,
            Side::Sell => &mut self.best_ask,
        }
    }

    #[inline]
    fn best_price(&self, side: Side) -> Option<u64> {
        self.best(side).map(|key| self.orders[key].price())
    }

    #[inline]
    fn index(&self, side: Side) -> &PriceIndex<usize> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    fn index_mut(&mut self, side: Side) -> &mut PriceIndex<usize> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Total number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    #[inline]
    pub fn contains_order(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Look up a resting order by ID
    pub fn order(&self, order_id: u64) -> Option<&Order> {
        let key = *self.order_index.get(&order_id)?;
        self.orders.get(key).map(|node| &node.order)
    }

    /// Aggregates of the level at `price` on `side`
    pub fn level(&self, side: Side, price: u64) -> Option<LevelSummary> {
        let &key = self.index(side).search(price)?;
        self.levels.get(key).map(PriceLevel::summary)
    }

    /// Order IDs resting at `price` on `side`, in priority order
    pub fn orders_at(&self, side: Side, price: u64) -> Vec<u64> {
        self.index(side)
            .search(price)
            .and_then(|&key| self.levels.get(key))
            .map(|level| {
                level
                    .iter(&self.orders)
                    .map(|(_, node)| node.order_id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All levels of `side`, best price first
    pub fn depth(&self, side: Side) -> Vec<LevelSummary> {
        self.levels_best_first(side)
            .map(|level| level.summary())
            .collect()
    }

    fn levels_best_first(&self, side: Side) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        let levels = &self.levels;
        match side {
            Side::Buy => Box::new(self.bids.iter().rev().map(move |(_, &k)| &levels[k])),
            Side::Sell => Box::new(self.asks.iter().map(move |(_, &k)| &levels[k])),
        }
    }

    // ========================================================================
    // State Root
    // ========================================================================

    /// SHA-256 digest of the resting book.
    ///
    /// Orders are SSZ-encoded in priority order: asks from the lowest price,
    /// then bids from the highest, each level head to tail. Books with the
    /// same resting orders in the same queue positions share a root.
    pub fn state_root(&self) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();

        for side in [Side::Sell, Side::Buy] {
            for level in self.levels_best_first(side) {
                for (_, node) in level.iter(&self.orders) {
                    let bytes = ssz_rs::serialize(&node.order)
                        .map_err(|e| BookError::Encoding(format!("{:?}", e)))?;
                    hasher.update(&bytes);
                }
            }
        }

        let result = hasher.finalize();
        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        Ok(root)
    }

    /// State root as a lowercase hex string
    pub fn state_root_hex(&self) -> Result<String> {
        self.state_root().map(hex::encode)
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Check every structural invariant of the book.
    ///
    /// Walks all levels and chains, so this is O(n). Meant for tests and
    /// debugging, not the hot path.
    pub fn validate(&self) -> Result<()> {
        let mut reachable = 0usize;

        for side in [Side::Buy, Side::Sell] {
            for (price, &level_key) in self.index(side).iter() {
                let level = self.levels.get(level_key).ok_or_else(|| {
                    BookError::inconsistent(format!("{} level {} has dangling handle", side, price))
                })?;

                if level.price != price || level.side != side {
                    return Err(BookError::inconsistent(format!(
                        "{} level {} is filed under {} {}",
                        level.side, level.price, side, price
                    )));
                }
                if level.is_empty() {
                    return Err(BookError::inconsistent(format!(
                        "{} level {} is empty but indexed",
                        side, price
                    )));
                }

                let mut count = 0usize;
                let mut volume = 0u64;
                let mut prev = None;
                for (key, node) in level.iter(&self.orders) {
                    if node.prev != prev {
                        return Err(BookError::inconsistent(format!(
                            "order {} has a broken back link",
                            node.order_id()
                        )));
                    }
                    if node.level != level_key || node.price() != price || node.side() != side {
                        return Err(BookError::inconsistent(format!(
                            "order {} does not belong to {} level {}",
                            node.order_id(),
                            side,
                            price
                        )));
                    }
                    if self.order_index.get(&node.order_id()) != Some(&key) {
                        return Err(BookError::inconsistent(format!(
                            "order {} is not indexed by ID",
                            node.order_id()
                        )));
                    }
                    count += 1;
                    volume = volume.checked_add(node.quantity()).ok_or_else(|| {
                        BookError::inconsistent(format!(
                            "{} level {} volume overflows",
                            side, price
                        ))
                    })?;
                    prev = Some(key);
                }

                if level.tail != prev {
                    return Err(BookError::inconsistent(format!(
                        "{} level {} tail is stale",
                        side, price
                    )));
                }
                if count != level.order_count || volume != level.total_quantity {
                    return Err(BookError::inconsistent(format!(
                        "{} level {} records {} orders / {} volume, chain has {} / {}",
                        side, price, level.order_count, level.total_quantity, count, volume
                    )));
                }
                reachable += count;
            }

            let expected_best = match side {
                Side::Buy => self.bids.max(),
                Side::Sell => self.asks.min(),
            }
            .and_then(|(_, &lk)| self.levels.get(lk))
            .and_then(PriceLevel::peek_head);

            if self.best(side) != expected_best {
                return Err(BookError::inconsistent(format!(
                    "cached best {} order is not the head of the best level",
                    side
                )));
            }
        }

        if reachable != self.orders.len() || reachable != self.order_index.len() {
            return Err(BookError::inconsistent(format!(
                "{} orders reachable from levels, {} stored, {} indexed",
                reachable,
                self.orders.len(),
                self.order_index.len()
            )));
        }
        if self.levels.len() != self.bids.len() + self.asks.len() {
            return Err(BookError::inconsistent("orphaned price level in the arena"));
        }

        if let (Some(bid), Some(ask)) = (self.best_price(Side::Buy), self.best_price(Side::Sell)) {
            if ask <= bid {
                return Err(BookError::inconsistent(format!(
                    "book is crossed: bid {} >= ask {}",
                    bid, ask
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
