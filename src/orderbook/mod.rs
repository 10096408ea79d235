//! Order book with cached top of book.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: orders and price levels live in arenas and refer
//!   to each other by `usize` handle
//! - **Price index**: levels per side keyed by price in a `BTreeMap`
//! - **Price-time priority**: FIFO ordering at each price level
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus queue links and its level handle
//! - [`PriceLevel`]: FIFO queue and aggregates for one price
//! - [`PriceIndex`]: ordered price -> value map with successor/predecessor
//! - [`OrderBook`]: both sides, the ID table and the best-order cache
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Submit | O(log L) |
//! | Cancel by ID | O(log L) |
//! | Crossing check | O(1) |
//! | Best bid/ask | O(1) |
//!
//! L = number of distinct price levels on the affected side.

pub mod node;
pub mod level;
pub mod index;
pub mod book;

pub use node::OrderNode;
pub use level::{LevelIter, LevelSummary, PriceLevel};
pub use index::PriceIndex;
pub use book::OrderBook;
