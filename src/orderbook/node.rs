//! Order node for slab-based storage.
//!
//! ## Design
//!
//! `OrderNode` wraps an `Order` with doubly-linked list handles for its price
//! level queue and a handle to the level itself. All three are slab keys, so
//! unlinking an order is O(1) and never touches a raw pointer.
//!
//! ## Linked List
//!
//! Orders at the same price level form a doubly-linked list:
//! - `next`: the next (newer) order in the level
//! - `prev`: the previous (older) order in the level
//! - `level`: slab key of the owning `PriceLevel`

use crate::types::{Order, Side};

/// Order node stored in the order slab.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The actual order data
    pub order: Order,

    /// Next order in the price level queue (slab key)
    /// None if this is the tail (newest order)
    pub next: Option<usize>,

    /// Previous order in the price level queue (slab key)
    /// None if this is the head (oldest order)
    pub prev: Option<usize>,

    /// Owning price level (slab key into the level slab)
    pub level: usize,
}

impl OrderNode {
    /// Create a new order node belonging to `level` (not yet linked)
    ///
    /// # Example
    ///
    /// ```
    /// use tob_book::orderbook::OrderNode;
    /// use tob_book::types::{Order, Side};
    ///
    /// let order = Order::new(1, 100, Side::Buy, 100, 10);
    /// let node = OrderNode::new(order, 0);
    ///
    /// assert!(node.next.is_none());
    /// assert!(node.prev.is_none());
    /// ```
    #[inline]
    pub fn new(order: Order, level: usize) -> Self {
        Self {
            order,
            next: None,
            prev: None,
            level,
        }
    }

    /// Check if this node has no neighbours in its queue
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    #[inline]
    pub fn owner_id(&self) -> u64 {
        self.order.owner_id
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price
    }

    #[inline]
    pub fn quantity(&self) -> u64 {
        self.order.quantity
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.order.side()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_node_new() {
        let order = Order::new(1, 9, Side::Sell, 105, 5);
        let node = OrderNode::new(order.clone(), 3);

        assert_eq!(node.order, order);
        assert_eq!(node.level, 3);
        assert!(node.is_unlinked());
    }

    #[test]
    fn test_order_node_accessors() {
        let node = OrderNode::new(Order::new(42, 9, Side::Sell, 105, 5), 0);

        assert_eq!(node.order_id(), 42);
        assert_eq!(node.owner_id(), 9);
        assert_eq!(node.price(), 105);
        assert_eq!(node.quantity(), 5);
        assert_eq!(node.side(), Side::Sell);
    }

    #[test]
    fn test_order_node_linking() {
        let mut node = OrderNode::new(Order::new(1, 9, Side::Buy, 100, 10), 0);

        node.next = Some(2);
        assert!(!node.is_unlinked());

        node.next = None;
        node.prev = Some(0);
        assert!(!node.is_unlinked());
    }
}
