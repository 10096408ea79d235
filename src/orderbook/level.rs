//! Price level management for orders at the same price.
//!
//! ## Design
//!
//! A `PriceLevel` represents all resting orders at a single price on one
//! side. Orders are kept in a doubly-linked list for FIFO ordering
//! (price-time priority).
//!
//! ## Queue Structure
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! - New orders are appended at the tail
//! - The head is the level's representative order for top of book
//! - Any order can be removed in O(1) using its slab key

use slab::Slab;

use crate::orderbook::OrderNode;
use crate::types::{Quote, Side};

/// A price level containing orders at a single price.
///
/// The order data lives in the order slab; this struct only holds the
/// queue metadata and the running aggregates.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Price for this level
    pub price: u64,

    /// Side this level rests on
    pub side: Side,

    /// Total resting quantity at this level
    pub total_quantity: u64,

    /// Head of the order queue (oldest order, slab key)
    pub head: Option<usize>,

    /// Tail of the order queue (newest order, slab key)
    pub tail: Option<usize>,

    /// Number of orders at this price level
    pub order_count: usize,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(price: u64, side: Side) -> Self {
        Self {
            price,
            side,
            total_quantity: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Price and aggregate volume of this level
    #[inline]
    pub fn quote(&self) -> Quote {
        Quote {
            price: self.price,
            volume: self.total_quantity,
        }
    }

    pub fn summary(&self) -> LevelSummary {
        LevelSummary {
            price: self.price,
            orders: self.order_count,
            volume: self.total_quantity,
        }
    }

    /// Add an order to the tail of the queue
    ///
    /// # Panics
    ///
    /// Panics if `key` or the current tail is not present in the slab, or if
    /// the order's quantity overflows `total_quantity`. Callers check the
    /// latter with [`PriceLevel::can_absorb`].
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let node = &mut slab[key];
        let quantity = node.quantity();

        node.prev = self.tail;
        node.next = None;

        if let Some(tail_key) = self.tail {
            slab[tail_key].next = Some(key);
        } else {
            // Empty list - this is also the head
            self.head = Some(key);
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity += quantity;
    }

    /// Unlink an order from the queue by slab key
    ///
    /// The node stays in the slab with cleared links; the caller owns its
    /// removal.
    ///
    /// # Returns
    ///
    /// The quantity of the unlinked order
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> u64 {
        let node = &slab[key];
        let quantity = node.quantity();
        let prev_key = node.prev;
        let next_key = node.next;

        if let Some(prev) = prev_key {
            slab[prev].next = next_key;
        } else {
            // This was the head
            self.head = next_key;
        }

        if let Some(next) = next_key {
            slab[next].prev = prev_key;
        } else {
            // This was the tail
            self.tail = prev_key;
        }

        let node = &mut slab[key];
        node.prev = None;
        node.next = None;

        self.order_count -= 1;
        self.total_quantity -= quantity;

        quantity
    }

    /// True if `quantity` more volume fits in `total_quantity`
    #[inline]
    pub fn can_absorb(&self, quantity: u64) -> bool {
        self.total_quantity.checked_add(quantity).is_some()
    }

    /// Get the head order's slab key (oldest order)
    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Walk the queue head to tail
    pub fn iter<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            slab,
            cursor: self.head,
        }
    }
}

/// Aggregate view of one price level, as reported by depth queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSummary {
    pub price: u64,
    pub orders: usize,
    pub volume: u64,
}

/// Head-to-tail iterator over the nodes of one price level.
///
/// Yields `(slab key, node)`. A dangling handle ends the walk.
pub struct LevelIter<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (usize, &'a OrderNode);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let node = self.slab.get(key)?;
        self.cursor = node.next;
        Some((key, node))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
