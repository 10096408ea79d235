//! # tob-book
//!
//! Single-instrument limit order book with continuous top-of-book tracking,
//! built as the core of exchange simulators and backtesting harnesses.
//!
//! ## Architecture
//!
//! - **Types**: Order, Side, output events
//! - **OrderBook**: slab-backed price levels with cached best bid/ask
//! - **Engine**: the book behind one exclusive lock, plus replay sessions
//! - **Feed**: CSV command stream decoding
//!
//! ## Design Principles
//!
//! 1. **No matching**: orders that would cross the book are rejected
//! 2. **Price-time priority**: FIFO within a level, head order represents it
//! 3. **Arena handles**: orders and levels link through slab keys, never pointers
//! 4. **Synchronous execution**: every operation completes in O(log L)
//!
//! ## Output
//!
//! ```text
//! A, 1, 1
//! B, B, 100, 10
//! R, 2, 2
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Side, BookEvent
pub mod types;

/// Order book: price levels, price index and top-of-book cache
pub mod orderbook;

/// Shared engine and replay sessions
pub mod engine;

/// Command stream decoding
pub mod feed;

/// Run configuration
pub mod config;

/// Error types
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use types::{BookEvent, Order, Quote, Side};
pub use orderbook::{OrderBook, OrderNode, PriceIndex, PriceLevel};
pub use engine::{Engine, Session, SessionStats};
pub use feed::{Command, CommandReader, Record};
pub use config::{Config, ErrorPolicy};
pub use error::{BookError, Result};
