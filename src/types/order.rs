//! Order types for the top-of-book engine.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so a resting book can be
//! encoded into a deterministic byte stream for state digests:
//! - Basic types (u64, u8): Direct little-endian encoding
//! - Fixed-size composites: Concatenated little-endian fields
//!
//! Prices and quantities are plain integer ticks/lots. No scaling is applied.

use std::fmt;

use ssz_rs::prelude::*;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Buy order (bid)
    #[default]
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Decode the side flag of a command record: `S` is a sell, anything else a buy.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "S" {
            Side::Sell
        } else {
            Side::Buy
        }
    }

    /// Symbol used in top-of-book lines (`S` for the ask side, `B` for the bid side).
    pub fn symbol(self) -> &'static str {
        match self {
            Side::Buy => "B",
            Side::Sell => "S",
        }
    }

    /// True if `price` is strictly better than `reference` for this side.
    #[inline]
    pub fn improves(self, price: u64, reference: u64) -> bool {
        match self {
            Side::Buy => price > reference,
            Side::Sell => price < reference,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A resting limit order.
///
/// ## SSZ Layout
///
/// Fixed-size container of 33 bytes (8+8+1+8+8).
///
/// ## Example
///
/// ```
/// use tob_book::types::{Order, Side};
///
/// let order = Order::new(1, 100, Side::Buy, 100, 10);
/// assert_eq!(order.side(), Side::Buy);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier (assigned by the command stream)
    pub id: u64,

    /// Owner/account identifier, echoed back in acknowledgements
    pub owner_id: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Limit price
    pub price: u64,

    /// Resting quantity
    pub quantity: u64,
}

impl Order {
    /// Create a new limit order
    ///
    /// # Arguments
    ///
    /// * `id` - Unique order identifier
    /// * `owner_id` - Owner/account identifier
    /// * `side` - Buy or Sell
    /// * `price` - Limit price
    /// * `quantity` - Order quantity
    pub fn new(id: u64, owner_id: u64, side: Side, price: u64, quantity: u64) -> Self {
        Self {
            id,
            owner_id,
            side_raw: side.to_u8(),
            price,
            quantity,
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
